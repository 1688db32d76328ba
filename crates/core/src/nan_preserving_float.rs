macro_rules! float {
    (
        $( #[$docs:meta] )*
        struct $name:ident($rep:ty as $prim:ty);
    ) => {
        $( #[$docs] )*
        #[derive(Copy, Clone)]
        pub struct $name($rep);

        impl $name {
            /// Creates a float from its underlying bits.
            #[inline]
            pub const fn from_bits(bits: $rep) -> Self {
                Self(bits)
            }

            /// Returns the underlying bits of the float.
            #[inline]
            pub const fn to_bits(self) -> $rep {
                self.0
            }

            /// Creates a float from the respective primitive float type.
            #[inline]
            pub fn from_float(float: $prim) -> Self {
                Self(float.to_bits())
            }

            /// Returns the respective primitive float type.
            #[inline]
            pub fn to_float(self) -> $prim {
                <$prim>::from_bits(self.0)
            }

            /// Returns `true` if the float is a NaN of any bit pattern.
            #[inline]
            pub fn is_nan(self) -> bool {
                self.to_float().is_nan()
            }
        }

        impl From<$prim> for $name {
            #[inline]
            fn from(float: $prim) -> Self {
                Self::from_float(float)
            }
        }

        impl From<$name> for $prim {
            #[inline]
            fn from(float: $name) -> Self {
                float.to_float()
            }
        }

        impl PartialEq for $name {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.to_float() == other.to_float()
            }
        }

        impl PartialOrd for $name {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<::core::cmp::Ordering> {
                self.to_float().partial_cmp(&other.to_float())
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                if self.is_nan() {
                    return write!(f, "nan:0x{:X?}", self.to_bits());
                }
                ::core::fmt::Debug::fmt(&self.to_float(), f)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                if self.is_nan() {
                    return write!(f, "nan:0x{:X?}", self.to_bits());
                }
                ::core::fmt::Display::fmt(&self.to_float(), f)
            }
        }
    };
}

float! {
    /// A NaN preserving `f32` type.
    ///
    /// Wasm requires the exact NaN bit pattern produced by an operation to
    /// survive moves through locals, globals and linear memory. Keeping the
    /// raw bits instead of an `f32` avoids the platform dependent NaN
    /// quieting that `f32` copies may perform.
    struct F32(u32 as f32);
}

float! {
    /// A NaN preserving `f64` type.
    struct F64(u64 as f64);
}
