mod barcode;
mod catalog;
mod common;
mod scenarios;
mod stock;
