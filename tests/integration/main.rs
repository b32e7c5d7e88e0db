mod common;
mod crosscheck;
mod live;
