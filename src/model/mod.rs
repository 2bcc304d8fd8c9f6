// File: ./src/model/mod.rs
pub mod display;
pub mod item;
pub mod normalize;
pub mod ranking;

pub use item::{
    AggregationResult, AuthorizationState, CalendarEvent, CompletionFilter, DueComponents,
    ListHandle, ListOverview, NewItem, NormalizedItem, RawItem,
};
pub use normalize::Normalizer;
