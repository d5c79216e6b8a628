//! # Binding Table
//!
//! Data-driven attribute and uniform dispatch. A primitive does not hard-code
//! which GPU calls it makes while drawing: it carries a [`BindingTable`] of
//!
//! - **attributes**: a name, a buffer and the layout the GPU reads it with
//! - **uniforms**: a name and a [`UniformSource`], a call kind paired with a
//!   producer that computes the call's arguments from the live frame state
//!
//! Names are resolved to program locations once the shader program is linked
//! and again after every append. Uniform values are produced fresh on every
//! draw.

pub mod attribute;
pub mod table;
pub mod uniform;

pub use attribute::{AttributeBinding, AttributeLayout, DataType};
pub use table::{BindingTable, UniformBinding};
pub use uniform::{FrameContext, Producer, UniformKind, UniformSource, UniformValue};
