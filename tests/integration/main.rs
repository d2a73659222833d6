//! Integration tests driving the router and services against a scratch SQLite file

mod common;

mod api_tests;
mod repository_tests;
