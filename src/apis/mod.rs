pub mod spacex;
