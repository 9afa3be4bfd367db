#![allow(dead_code)]

pub mod bootstrap_server;
