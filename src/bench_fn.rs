/// A function that can be benchmarked against a working argument set `W`, returning `R`.
///
/// Implemented for every `Fn` taking one `&mut` per argument position, e.g.
/// `Fn(&mut Vec<f32>) -> f32` for the working set `(Vec<f32>,)` or
/// `Fn(&mut RawBuffer<i32>, &mut usize) -> usize` for `(RawBuffer<i32>, usize)`.
/// Parameter types of closures need to be annotated, since they can't be inferred through
/// this trait.
pub trait BenchFn<W, R> {
    /// Calls the function with the elements of the working set.
    fn call(&self, working: &mut W) -> R;
}

impl<Fun, R> BenchFn<(), R> for Fun
where
    Fun: Fn() -> R,
{
    #[inline]
    fn call(&self, _working: &mut ()) -> R {
        (self)()
    }
}

macro_rules! impl_bench_fn {
    ($($T:ident $t:ident),+) => {
        impl<Fun, R, $($T),+> BenchFn<($($T,)+), R> for Fun
        where
            Fun: Fn($(&mut $T),+) -> R,
        {
            #[inline]
            fn call(&self, working: &mut ($($T,)+)) -> R {
                let ($($t,)+) = working;
                (self)($($t),+)
            }
        }
    };
}

impl_bench_fn!(A a);
impl_bench_fn!(A a, B b);
impl_bench_fn!(A a, B b, C c);
impl_bench_fn!(A a, B b, C c, D d);
impl_bench_fn!(A a, B b, C c, D d, E e);
impl_bench_fn!(A a, B b, C c, D d, E e, G g);
impl_bench_fn!(A a, B b, C c, D d, E e, G g, H h);
impl_bench_fn!(A a, B b, C c, D d, E e, G g, H h, I i);

/// Type-erased benchmarked function, as stored by the harness.
pub(crate) type BoxedFn<'a, W, R> = Box<dyn Fn(&mut W) -> R + 'a>;

pub(crate) fn boxed<'a, W, R, F>(fun: F) -> BoxedFn<'a, W, R>
where
    F: BenchFn<W, R> + 'a,
{
    Box::new(move |working: &mut W| fun.call(working))
}
