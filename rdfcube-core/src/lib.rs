//! rdfcube core library.
//!
//! Turns a [`Table`] and a [`CubeDescription`] into a cube.link data cube and
//! serializes it as Turtle.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod cube;
mod description;
mod error;
pub mod rdf;
mod table;

pub use crate::{
    builder::{CubeBuilder, MissingValuePolicy},
    cube::{Cube, CubeIris},
    description::{
        AccrualPeriodicity, Agent, ContactPoint, CubeDescription, DataKind, Datatype, Dimension,
        DimensionType, Dimensions, LangMap, Mapping, ScaleType, TimeUnit, WorkStatus,
    },
    error::{
        CubeError, CubeErrorCode, DescriptionError, DescriptionErrorCode, Result, TableError,
        TableErrorCode,
    },
    table::{MemoryTable, Table, Value},
};
