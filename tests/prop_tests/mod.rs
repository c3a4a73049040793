mod paginate;
mod store;
