//! Classification and copying of benchmark arguments.
//!
//! Every argument position gets an [ArgDescriptor] once, when the benchmark is built. The
//! descriptor decides how a fresh working copy is produced before each call:
//!
//! * [ArgDescriptor::Scalar] values are copied.
//! * [ArgDescriptor::Container] values are cloned.
//! * [ArgDescriptor::RawBuffer] pointers get `count` elements copied into a new [RawBuffer].
//!
//! Descriptors are inferred from the [ParamShape] each argument reports: a pointer directly
//! followed by an integer becomes a raw buffer with that many elements, a lone pointer a raw
//! buffer of one element, containers stay containers and everything else is a scalar. They
//! can also be passed explicitly via
//! [BenchmarkBuilder::descriptors](crate::BenchmarkBuilder::descriptors).

mod plan;
mod raw_buffer;

pub use plan::ArgPlan;
pub(crate) use plan::WorkingSlot;
pub use raw_buffer::{RawBuffer, RawPtr};

use std::{
    any::Any,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    fmt,
};

use crate::error::{HarnessError, Result};

/// What an argument reports about itself, before it is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    /// A pointer to one or more elements.
    Pointer,
    /// An integer. Carries its value if it is a valid element count.
    Integer(Option<usize>),
    /// Something with a beginning, an end and a size.
    Container,
    /// Anything else.
    Other,
}

/// Number of elements copied for a raw buffer argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    /// Element count.
    pub count: usize,
}

impl BufferDescriptor {
    /// Descriptor copying `count` elements.
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

/// Classification of one argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgDescriptor {
    /// Copied by value.
    Scalar,
    /// Deep copied by cloning.
    Container,
    /// Copied element-wise into freshly allocated storage.
    RawBuffer(BufferDescriptor),
}

impl ArgDescriptor {
    /// Whether the argument must be copied anew before every call.
    pub fn needs_fresh_copy(&self) -> bool {
        !matches!(self, ArgDescriptor::Scalar)
    }
}

impl fmt::Display for ArgDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgDescriptor::Scalar => write!(f, "Scalar"),
            ArgDescriptor::Container => write!(f, "Container"),
            ArgDescriptor::RawBuffer(buffer) => write!(f, "RawBuffer({})", buffer.count),
        }
    }
}

/// A single benchmark argument.
///
/// Implemented for the numeric primitives, `bool` and `char` (scalars), the std collections,
/// `String` and arrays (containers), and [RawPtr] (raw buffers). Use [Scalar] or [Container]
/// to declare other types.
pub trait BenchArg {
    /// The type handed to the benchmarked functions.
    type Working;

    /// The shape used to infer the descriptor.
    fn shape(&self) -> ParamShape;

    /// Checks that the argument can be copied as described. Called once at construction.
    fn validate(&self, _descriptor: ArgDescriptor) -> Result<()> {
        Ok(())
    }

    /// Produces a fresh working copy.
    fn materialize(&self, descriptor: ArgDescriptor) -> Result<Self::Working>;

    /// Resets a reused working copy to the original value.
    ///
    /// Scalars are overwritten in place. Other arguments are materialized anew.
    fn restore(&self, descriptor: ArgDescriptor, working: &mut Self::Working) -> Result<()> {
        *working = self.materialize(descriptor)?;
        Ok(())
    }
}

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {$(
        impl BenchArg for $t {
            type Working = $t;
            fn shape(&self) -> ParamShape {
                ParamShape::Other
            }
            #[inline]
            fn materialize(&self, _descriptor: ArgDescriptor) -> Result<$t> {
                Ok(*self)
            }
            #[inline]
            fn restore(&self, _descriptor: ArgDescriptor, working: &mut $t) -> Result<()> {
                *working = *self;
                Ok(())
            }
        }
    )*};
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {$(
        impl BenchArg for $t {
            type Working = $t;
            fn shape(&self) -> ParamShape {
                ParamShape::Integer(usize::try_from(*self).ok())
            }
            #[inline]
            fn materialize(&self, _descriptor: ArgDescriptor) -> Result<$t> {
                Ok(*self)
            }
            #[inline]
            fn restore(&self, _descriptor: ArgDescriptor, working: &mut $t) -> Result<()> {
                *working = *self;
                Ok(())
            }
        }
    )*};
}

impl_scalar!(f32, f64, bool, char);
impl_integer!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

macro_rules! impl_container {
    ($(<$($g:ident),*> $t:ty),* $(,)?) => {$(
        impl<$($g: Clone),*> BenchArg for $t {
            type Working = $t;
            fn shape(&self) -> ParamShape {
                ParamShape::Container
            }
            fn materialize(&self, _descriptor: ArgDescriptor) -> Result<Self::Working> {
                Ok(self.clone())
            }
        }
    )*};
}

impl_container!(
    <T> Vec<T>,
    <T> VecDeque<T>,
    <T> BTreeSet<T>,
    <K, V> BTreeMap<K, V>,
    <T, S> HashSet<T, S>,
    <K, V, S> HashMap<K, V, S>,
);
impl_container!(<> String);

impl<T: Clone, const N: usize> BenchArg for [T; N] {
    type Working = [T; N];
    fn shape(&self) -> ParamShape {
        ParamShape::Container
    }
    fn materialize(&self, _descriptor: ArgDescriptor) -> Result<[T; N]> {
        Ok(self.clone())
    }
}

impl<'a, T: Copy> BenchArg for RawPtr<'a, T> {
    type Working = RawBuffer<T>;
    fn shape(&self) -> ParamShape {
        ParamShape::Pointer
    }
    fn validate(&self, descriptor: ArgDescriptor) -> Result<()> {
        match descriptor {
            ArgDescriptor::RawBuffer(buffer) => self.check(buffer.count),
            other => Err(HarnessError::invalid(format!(
                "pointer argument described as {other}"
            ))),
        }
    }
    fn materialize(&self, descriptor: ArgDescriptor) -> Result<RawBuffer<T>> {
        match descriptor {
            ArgDescriptor::RawBuffer(buffer) => self.copy_out(buffer.count),
            other => Err(HarnessError::invalid(format!(
                "pointer argument described as {other}"
            ))),
        }
    }
}

/// Declares any `Copy` type as scalar argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scalar<T>(pub T);

impl<T: Copy> BenchArg for Scalar<T> {
    type Working = T;
    fn shape(&self) -> ParamShape {
        ParamShape::Other
    }
    #[inline]
    fn materialize(&self, _descriptor: ArgDescriptor) -> Result<T> {
        Ok(self.0)
    }
    #[inline]
    fn restore(&self, _descriptor: ArgDescriptor, working: &mut T) -> Result<()> {
        *working = self.0;
        Ok(())
    }
}

/// Declares any `Clone` type as container argument, deep copied before every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Container<C>(pub C);

impl<C: Clone> BenchArg for Container<C> {
    type Working = C;
    fn shape(&self) -> ParamShape {
        ParamShape::Container
    }
    fn materialize(&self, _descriptor: ArgDescriptor) -> Result<C> {
        Ok(self.0.clone())
    }
}

/// The full argument list of a benchmarked signature.
///
/// Implemented for tuples of up to eight [BenchArg]s and for `()`.
pub trait ArgSet {
    /// The working argument set, one working value per position.
    type Working;

    /// Shapes of all positions, in order.
    fn shapes(&self) -> Vec<ParamShape>;

    /// Validates every position against its descriptor.
    fn validate(&self, descriptors: &[ArgDescriptor]) -> Result<()>;

    /// Produces a fresh working set.
    fn materialize(&self, descriptors: &[ArgDescriptor]) -> Result<Self::Working>;

    /// Resets a reused working set in place.
    fn restore(&self, descriptors: &[ArgDescriptor], working: &mut Self::Working) -> Result<()>;
}

impl ArgSet for () {
    type Working = ();
    fn shapes(&self) -> Vec<ParamShape> {
        Vec::new()
    }
    fn validate(&self, _descriptors: &[ArgDescriptor]) -> Result<()> {
        Ok(())
    }
    fn materialize(&self, _descriptors: &[ArgDescriptor]) -> Result<()> {
        Ok(())
    }
    fn restore(&self, _descriptors: &[ArgDescriptor], _working: &mut ()) -> Result<()> {
        Ok(())
    }
}

fn descriptor_at(descriptors: &[ArgDescriptor], idx: usize) -> Result<ArgDescriptor> {
    descriptors
        .get(idx)
        .copied()
        .ok_or_else(|| HarnessError::invalid(format!("no descriptor for argument {}", idx + 1)))
}

macro_rules! impl_arg_set {
    ($($T:ident $idx:tt),+) => {
        impl<$($T: BenchArg),+> ArgSet for ($($T,)+) {
            type Working = ($(<$T as BenchArg>::Working,)+);

            fn shapes(&self) -> Vec<ParamShape> {
                vec![$(self.$idx.shape()),+]
            }

            fn validate(&self, descriptors: &[ArgDescriptor]) -> Result<()> {
                $(self.$idx.validate(descriptor_at(descriptors, $idx)?)?;)+
                Ok(())
            }

            fn materialize(&self, descriptors: &[ArgDescriptor]) -> Result<Self::Working> {
                Ok(($(self.$idx.materialize(descriptor_at(descriptors, $idx)?)?,)+))
            }

            fn restore(
                &self,
                descriptors: &[ArgDescriptor],
                working: &mut Self::Working,
            ) -> Result<()> {
                $(self.$idx.restore(descriptor_at(descriptors, $idx)?, &mut working.$idx)?;)+
                Ok(())
            }
        }

        impl<$($T: 'static),+> FindByType for ($($T,)+) {
            fn find_first<S: Clone + 'static>(&self) -> Option<S> {
                $(
                    let element: &dyn Any = &self.$idx;
                    if let Some(found) = element.downcast_ref::<S>() {
                        return Some(found.clone());
                    }
                )+
                None
            }
        }
    };
}

impl_arg_set!(A 0);
impl_arg_set!(A 0, B 1);
impl_arg_set!(A 0, B 1, C 2);
impl_arg_set!(A 0, B 1, C 2, D 3);
impl_arg_set!(A 0, B 1, C 2, D 3, E 4);
impl_arg_set!(A 0, B 1, C 2, D 3, E 4, F 5);
impl_arg_set!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_arg_set!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

/// Lookup of a working set element by type.
pub trait FindByType {
    /// Clone of the first element of type `S`, if there is one.
    fn find_first<S: Clone + 'static>(&self) -> Option<S>;
}

impl FindByType for () {
    fn find_first<S: Clone + 'static>(&self) -> Option<S> {
        None
    }
}

/// State accessor capturing the first working set element of type `S`.
///
/// Pass it to [BenchmarkBuilder::void_with_state](crate::BenchmarkBuilder::void_with_state)
/// as `first_of_type::<_, S>`.
pub fn first_of_type<W: FindByType, S: Clone + 'static>(working: &W) -> Option<S> {
    working.find_first::<S>()
}

/// Infers one descriptor per position.
///
/// A pointer directly followed by an integer becomes a raw buffer of that many elements,
/// a lone pointer a raw buffer of one element. The integer itself stays a scalar.
pub fn infer_descriptors(shapes: &[ParamShape]) -> Result<Vec<ArgDescriptor>> {
    let mut descriptors = Vec::with_capacity(shapes.len());
    for (idx, shape) in shapes.iter().enumerate() {
        let descriptor = match shape {
            ParamShape::Pointer => match shapes.get(idx + 1) {
                Some(ParamShape::Integer(Some(count))) => {
                    ArgDescriptor::RawBuffer(BufferDescriptor::new(*count))
                }
                Some(ParamShape::Integer(None)) => {
                    return Err(HarnessError::invalid(format!(
                        "argument {} is not a valid length for the pointer before it",
                        idx + 2
                    )))
                }
                _ => ArgDescriptor::RawBuffer(BufferDescriptor::new(1)),
            },
            ParamShape::Container => ArgDescriptor::Container,
            ParamShape::Integer(_) | ParamShape::Other => ArgDescriptor::Scalar,
        };
        descriptors.push(descriptor);
    }
    Ok(descriptors)
}

/// Checks explicitly passed descriptors against the shapes of the arguments.
pub fn check_descriptors(shapes: &[ParamShape], descriptors: &[ArgDescriptor]) -> Result<()> {
    if shapes.len() != descriptors.len() {
        return Err(HarnessError::invalid(format!(
            "{} descriptors for {} arguments",
            descriptors.len(),
            shapes.len()
        )));
    }
    for (idx, (shape, descriptor)) in shapes.iter().zip(descriptors).enumerate() {
        let fits = matches!(
            (shape, descriptor),
            (ParamShape::Pointer, ArgDescriptor::RawBuffer(_))
                | (ParamShape::Container, ArgDescriptor::Container)
                | (ParamShape::Integer(_) | ParamShape::Other, ArgDescriptor::Scalar)
        );
        if !fits {
            return Err(HarnessError::invalid(format!(
                "argument {} of shape {:?} cannot be described as {}",
                idx + 1,
                shape,
                descriptor
            )));
        }
    }
    Ok(())
}
