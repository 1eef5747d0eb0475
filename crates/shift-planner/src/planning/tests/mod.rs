mod common;
mod rules;
mod staff;
mod support;
