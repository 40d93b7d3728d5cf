pub mod blame_tracker;
