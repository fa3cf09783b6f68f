use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BodyError {
    #[error("Invalid body parameter: {0}")]
    InvalidArgument(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RootFindError {
    #[error("Root find brackets not suitable: f(xl) = {fl}, f(xh) = {fh}, target = {y}")]
    UnsuitableBrackets { y: f64, fl: f64, fh: f64 },

    #[error("Root find diverging after {iterations} iterations")]
    Diverging { iterations: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Value out of domain: {0}")]
    Domain(String),

    #[error("Value out of range: {0}")]
    Range(String),

    #[error("Parameter used before it was set: {0}")]
    Unset(&'static str),

    #[error("Logic error: {0}")]
    Logic(String),

    #[error("Inconsistent viewing geometry: {0}")]
    InconsistentGeometry(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Invalid projection parameter: {0}")]
    InvalidParameter(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid map shape: {0}")]
    Shape(String),

    #[error("Root finding failed: {0}")]
    RootFind(#[from] RootFindError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Body error: {0}")]
    Body(#[from] BodyError),
}
