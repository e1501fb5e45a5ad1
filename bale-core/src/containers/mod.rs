//! Buffers that pack many variable-length records into one contiguous allocation.
//!
//! # Compound buffers
//!
//! The central type of this module is [`CompoundBuffer`]. It owns a single backing buffer plus two parallel
//! index arrays that record where each logical sub-buffer starts and how long it is. Appending a sub-buffer
//! copies its content to the end of the backing, so reading it back never involves more than one allocation
//! per buffer instead of one allocation per record. This makes compound buffers a good fit for ingesting
//! large amounts of text or geometry, e.g. the vertices of thousands of polylines.
//!
//! What the backing is and how sub-buffers are measured is decided by the [`CompoundBacking`] trait. Two
//! backings are provided:
//! - `String`, giving a [`CompoundStringBuffer`] whose sub-buffers are strings. Lengths are measured in bytes
//!   and sub-strings are trimmed when they are read
//! - [`TupleView`], giving a [`CompoundTupleBuffer`] whose sub-buffers are sequences of fixed-size numeric
//!   tuples (2D or 3D positions, normals etc.). Lengths are measured in tuples
//!
//! # Reading sub-buffers
//!
//! [`CompoundBuffer::get_sub_buffer`] always returns an owned copy of a sub-buffer, which stays valid no matter
//! what happens to the compound buffer afterwards. Where copies are too expensive, there are borrowing
//! accessors like [`CompoundStringBuffer::sub_str`] or [`CompoundTupleBuffer::sub_elements`]. Since appending
//! requires a mutable borrow, these views can't outlive a change to the buffer.
//!
//! # Subsets
//!
//! [`CompoundBuffer::subset`] creates a new compound buffer from an arbitrary list of sub-buffer indices. The
//! subset gets its own backing, so both buffers can be modified independently afterwards.
//!
//! # Tuple views
//!
//! A [`TupleView`] interprets a [`PrimitiveStore`](crate::storage::PrimitiveStore) as a sequence of tuples.
//! The element kind of the store is a runtime value, so [`TupleViewFactory`] creates tuple views for all
//! supported element kinds through the same code path. Tuples can be read and written as any
//! [`PrimitiveElement`](crate::layout::PrimitiveElement) type, with values converted as needed.

mod compound_buffer;
pub use self::compound_buffer::*;

mod compound_string_buffer;
pub use self::compound_string_buffer::*;

mod compound_tuple_buffer;
pub use self::compound_tuple_buffer::*;

mod tuple_view;
pub use self::tuple_view::TupleView;

mod tuple_view_factory;
pub use self::tuple_view_factory::*;
