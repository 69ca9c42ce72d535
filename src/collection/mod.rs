//! # Collection Module
//!
//! Route registration and compilation.
//!
//! ## Overview
//!
//! A [`RouteCollection`] is the mutable side of the routing table. Routes are added
//! through a small DSL:
//!
//! - `add` / `get` / `post` / `put` / `patch` / `delete` / `head` / `options`
//! - `match_verbs` for several verbs at once
//! - `group` for a shared prefix, namespace and middleware list
//! - `resource` for the seven conventional CRUD routes
//! - `add_redirect` for redirect routes
//!
//! Each pattern is compiled to an anchored regex at registration, expanding
//! placeholders such as `(:num)` or `{id}` against the collection's
//! [`PlaceholderTable`](crate::placeholder::PlaceholderTable).
//!
//! ## Compilation
//!
//! [`RouteCollection::compile`] produces a [`RouteTable`], the immutable view the
//! [`Router`](crate::router::Router) matches against. Tables are shared via `Arc`
//! and never change after compilation; rebuilding and swapping them is how a
//! long-lived process picks up new routes (see [`hot_reload`](crate::hot_reload)).
//!
//! ## Ordering
//!
//! Matching iterates the verb-specific bucket first, then the `ANY` bucket, each in
//! registration order. With [`RouteCollection::set_prioritize`] enabled, routes with
//! `priority >= 1` sort after all normal routes of the same bucket.

mod core;
mod definition;
mod group;
mod table;

pub use core::{ResourceOptions, RouteCollection, RESOURCE_ACTIONS};
pub use definition::{
    has_backreference, substitute_backreferences, ClosureHandler, CompiledPattern, HandlerSpec,
    RouteDefinition, RouteOptions, Verb, LOCALE_GROUP,
};
pub use group::{GroupContext, GroupOptions};
pub use table::{RouteSettings, RouteTable};
