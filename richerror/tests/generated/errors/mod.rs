// Code generated by richerror-gen. DO NOT EDIT.

pub mod notfound;
pub mod upstreamfailed;

pub use notfound::*;
pub use upstreamfailed::*;
