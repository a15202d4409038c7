//! Dependency coordinates and their resolution

mod coordinate;
mod resolver;

pub use coordinate::DependencyCoordinate;
pub use resolver::{
    CachingResolver, CompoundResolver, DEFAULT_RESOLUTION_CAPACITY, DependencyResolver,
    InMemoryResolver, LocalRepositoryResolver,
};
