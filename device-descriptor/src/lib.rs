#![cfg_attr(not(test), no_std)]

use core::marker::PhantomData;

pub trait RegisterWidthType: Copy {
    const WIDTH: u8;

    fn from_32(data: u32) -> Self;
    fn to_32(self) -> u32;
}

impl RegisterWidthType for u8 {
    const WIDTH: u8 = 8;

    fn from_32(data: u32) -> Self {
        debug_assert!(data <= u8::MAX as u32);
        data as u8
    }

    fn to_32(self) -> u32 {
        self as u32
    }
}

impl RegisterWidthType for u16 {
    const WIDTH: u8 = 16;

    fn from_32(data: u32) -> Self {
        debug_assert!(data <= u16::MAX as u32);
        data as u16
    }

    fn to_32(self) -> u32 {
        self as u32
    }
}

impl RegisterWidthType for u32 {
    const WIDTH: u8 = 32;

    fn from_32(data: u32) -> Self {
        data
    }

    fn to_32(self) -> u32 {
        self
    }
}

/// A value that can live in a register field.
///
/// `from_field_bits` receives the field already shifted down to bit 0 and masked to its width.
pub trait FieldType: Sized {
    fn from_field_bits(bits: u32) -> Option<Self>;
    fn into_field_bits(self) -> u32;
}

impl FieldType for bool {
    fn from_field_bits(bits: u32) -> Option<Self> {
        Some(bits != 0)
    }

    fn into_field_bits(self) -> u32 {
        self as u32
    }
}

impl FieldType for u8 {
    fn from_field_bits(bits: u32) -> Option<Self> {
        u8::try_from(bits).ok()
    }

    fn into_field_bits(self) -> u32 {
        self as u32
    }
}

impl FieldType for u16 {
    fn from_field_bits(bits: u32) -> Option<Self> {
        u16::try_from(bits).ok()
    }

    fn into_field_bits(self) -> u32 {
        self as u32
    }
}

pub trait ReadOnlyRegister: Proxy<Self::RegisterWidth> + Copy {
    type RegisterWidth: RegisterWidthType;

    const ADDRESS: u8;
    const NAME: &'static str;
}

pub trait Register: ReadOnlyRegister {
    type Writer: WriterProxy<Self::RegisterWidth>;

    const DEFAULT_VALUE: Self::RegisterWidth;

    fn new(f: impl Fn(Self::Writer) -> Self::Writer) -> Self;
    fn modify(self, f: impl Fn(Self::Writer) -> Self::Writer) -> Self;
}

pub trait Proxy<RWT: RegisterWidthType> {
    fn bits(&self) -> RWT;
    fn from_bits(bits: RWT) -> Self;
}

pub trait WriterProxy<RWT: RegisterWidthType>: Proxy<RWT> {
    fn write_bits(self, bits: RWT) -> Self;
    fn reset(self) -> Self;
}

pub struct Field<const POS: u8, const WIDTH: u8, DataType, P, RWT> {
    _marker: PhantomData<(DataType, RWT)>,
    reg: P,
}

impl<const POS: u8, const WIDTH: u8, DataType, P, RWT> Field<POS, WIDTH, DataType, P, RWT>
where
    DataType: FieldType,
    P: Proxy<RWT>,
    RWT: RegisterWidthType,
{
    const _CONST_CHECK: () = assert!(POS + WIDTH <= RWT::WIDTH);

    const MASK: u32 = if WIDTH >= 32 {
        u32::MAX
    } else {
        (1 << WIDTH) - 1
    };

    pub const fn new(reg: P) -> Self {
        Field {
            _marker: PhantomData,
            reg,
        }
    }

    #[inline(always)]
    pub fn read_field_bits(&self) -> u32 {
        #[allow(clippy::let_unit_value)]
        let _ = Self::_CONST_CHECK;

        (self.reg.bits().to_32() >> POS as u32) & Self::MASK
    }

    /// Returns `None` if the field holds a bit pattern the field type has no variant for.
    #[inline(always)]
    pub fn read(&self) -> Option<DataType> {
        DataType::from_field_bits(self.read_field_bits())
    }
}

impl<const POS: u8, const WIDTH: u8, DataType, P, RWT> Field<POS, WIDTH, DataType, P, RWT>
where
    DataType: FieldType,
    P: WriterProxy<RWT>,
    RWT: RegisterWidthType,
{
    #[inline(always)]
    fn write_field(data: RWT, value: u32) -> RWT {
        // make sure value fits into field
        debug_assert!(value <= Self::MASK);

        let shifted_mask = Self::MASK << POS;
        let masked_field = data.to_32() & !shifted_mask;

        RWT::from_32(masked_field | ((value & Self::MASK) << POS as u32))
    }

    #[inline(always)]
    pub fn write(self, value: DataType) -> P {
        let bits = self.reg.bits();

        self.reg
            .write_bits(Self::write_field(bits, value.into_field_bits()))
    }
}

#[macro_export]
macro_rules! impl_fields {
    () => {};

    ($($field:ident($rwt:ty, pos = $pos:literal, width = $width:literal): $type:ty),*) => {
        $(
            #[inline(always)]
            #[allow(non_snake_case)]
            pub fn $field(self) -> $crate::Field<$pos, $width, $type, Self, $rwt> {
                $crate::Field::new(self)
            }
        )*
    };
}

/// Declares the enum type of a field, if the field lists its variants.
#[macro_export]
macro_rules! field_type {
    ($type:ident) => {};

    ($type:ident { $( $name:ident = $value:literal ),+ }) => {
        #[derive(Debug, PartialEq, Eq, Copy, Clone)]
        pub enum $type {
            $($name = $value),+
        }

        impl $crate::FieldType for $type {
            fn from_field_bits(bits: u32) -> Option<Self> {
                match bits {
                    $($value => Some($type::$name),)+
                    _ => None,
                }
            }

            fn into_field_bits(self) -> u32 {
                self as u32
            }
        }
    };
}

#[macro_export]
macro_rules! register {
    (@base $reg:ident ($rwt:ty, addr = $addr:literal) {
        $( $field:ident(pos = $pos:literal, width = $width:literal): $type:ty ),*
    } ) => {
        impl $crate::ReadOnlyRegister for $reg {
            type RegisterWidth = $rwt;

            const ADDRESS: u8 = $addr;
            const NAME: &'static str = stringify!($reg);
        }

        impl $crate::Proxy<$rwt> for $reg {
            #[inline(always)]
            fn from_bits(bits: $rwt) -> Self {
                Self { value: bits }
            }

            #[inline(always)]
            fn bits(&self) -> $rwt {
                self.value
            }
        }

        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        #[must_use]
        #[allow(non_camel_case_types)]
        pub struct $reg {
            value: $rwt
        }

        impl $reg {
            $crate::impl_fields! { $($field($rwt, pos = $pos, width = $width): $type),* }
        }
    };

    (@base $reg:ident ($rwt:ty, addr = $addr:literal, default = $default:literal) {
        $( $field:ident(pos = $pos:literal, width = $width:literal): $type:ty ),*
    } ) => {
        $crate::register!(@base $reg($rwt, addr = $addr) { $( $field(pos = $pos, width = $width): $type ),* });

        impl Default for $reg {
            #[inline(always)]
            fn default() -> Self {
                <Self as $crate::Proxy<$rwt>>::from_bits($default)
            }
        }

        impl $crate::Register for $reg {
            type Writer = writer_proxies::$reg;

            const DEFAULT_VALUE: $rwt = $default;

            #[inline(always)]
            fn new(f: impl Fn(Self::Writer) -> Self::Writer) -> Self {
                use $crate::Proxy;

                Self::from_bits(
                    f(<Self::Writer as Proxy<$rwt>>::from_bits(Self::DEFAULT_VALUE)).bits()
                )
            }

            #[inline(always)]
            fn modify(self, f: impl Fn(Self::Writer) -> Self::Writer) -> Self {
                use $crate::Proxy;

                Self::from_bits(
                    f(<Self::Writer as Proxy<$rwt>>::from_bits(self.value)).bits()
                )
            }
        }

        impl writer_proxies::$reg {
            $crate::impl_fields! { $($field($rwt, pos = $pos, width = $width): $type),* }
        }
    };

    ($reg:ident $proto:tt {
        $( $field:ident(pos = $pos:literal, width = $width:literal): $type:ident $({
            $( $name:ident = $value:literal ),+
        })? ),*
    } ) => {
        $(
            $crate::field_type!($type $({ $( $name = $value ),+ })?);
        )*
        $crate::register!(@base $reg $proto { $( $field(pos = $pos, width = $width): $type ),*} );
    };
}

#[macro_export]
macro_rules! writer_proxy {
    (@base $reg:ident ($rwt:ty, addr = $addr:literal) {
        $( $field:ident(pos = $pos:literal, width = $width:literal): $type:ty ),*
    } ) => {};

    (@base $reg:ident ($rwt:ty, addr = $addr:literal, default = $default:literal) {
        $( $field:ident(pos = $pos:literal, width = $width:literal): $type:ty ),*
    } ) => {
        #[allow(non_camel_case_types)]
        pub struct $reg {
            bits: $rwt
        }

        impl $crate::Proxy<$rwt> for $reg {
            #[inline(always)]
            fn from_bits(bits: $rwt) -> Self {
                Self {
                    bits
                }
            }

            #[inline(always)]
            fn bits(&self) -> $rwt {
                self.bits
            }
        }

        impl $crate::WriterProxy<$rwt> for $reg {
            #[inline(always)]
            fn write_bits(self, bits: $rwt) -> Self {
                <Self as $crate::Proxy<$rwt>>::from_bits(bits)
            }

            #[inline(always)]
            fn reset(self) -> Self {
                self.write_bits($default)
            }
        }
    };

    ($reg:ident $proto:tt {
        $( $field:ident(pos = $pos:literal, width = $width:literal): $type:ident $({
            $( $name:ident = $value:literal ),+
        })? ),*
    } ) => {
        $crate::writer_proxy!(@base $reg $proto { $( $field(pos = $pos, width = $width): $type ),*} );
    };
}

/// Declares a set of registers.
///
/// Registers with a `default` value are writable and get a writer proxy, the others are
/// read-only views. The invoking module must not already contain a `writer_proxies` module.
#[macro_export]
macro_rules! device {
    (
        $( $reg:ident($($proto:tt)*) {
            $($fields:tt)*
        } )+
    ) => {

        mod writer_proxies {
            $(
                $crate::writer_proxy!($reg($($proto)*) { $($fields)* } );
            )+
        }

        $(
            $crate::register!($reg($($proto)*) { $($fields)* } );
        )+
    }
}
