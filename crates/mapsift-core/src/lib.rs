//! mapsift Core Types and Definitions
//!
//! This crate provides the foundational types for mapsift, the map object
//! filter and overlap resolver for OpenOrienteering Mapper documents. It
//! includes:
//!
//! - **Identifiers**: Typed symbol and object ids ([`identifier`] module)
//! - **Geometry**: Points, bounds, paths and regions ([`geometry`] module)
//! - **Symbols**: Symbol definitions and the priority heuristic ([`symbol`] module)
//! - **Objects**: Map object records and validated objects ([`object`] module)
//! - **Catalog**: Id and name lookups over a symbol set ([`catalog`] module)

pub mod catalog;
pub mod geometry;
pub mod identifier;
pub mod object;
pub mod symbol;
