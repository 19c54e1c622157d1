//! Catalog data types: stored records, partial patches and query filters

pub mod filter;
pub mod movie;
pub mod patch;

pub use filter::{
    Combinator, CriterionModifier, FindFilter, MovieFilter, MultiCriterion, Pagination,
    SortDirection, DEFAULT_PER_PAGE,
};
pub use movie::{
    default_movie_image, name_checksum, Movie, MovieImages, MovieName, MoviePatch, NewMovie,
};
pub use patch::{Patch, SetList};
