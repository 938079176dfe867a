mod calculator;
mod common;
mod engine;
