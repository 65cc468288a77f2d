/*!
riposte3d
========

**riposte3d** is a 3-dimensional narrow-phase collision detection and
contact generation library written with the rust programming language.

Given two convex shapes and their world transforms, it determines whether
they intersect and, if so, produces a small, stable set of contact points
(position, normal, penetration depth, feature id) suitable for a
constraint solver. Three algorithm families cooperate behind persistent
per-pair state machines: a closed-form separating-axis engine for box
pairs, a warm-started GJK for shallow margin contacts, and Minkowski
Portal Refinement for deep penetration and swept queries.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![doc(html_root_url = "http://docs.rs/riposte3d/0.1.0")]

#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod math;
pub mod query;
pub mod shape;
pub mod utils;
