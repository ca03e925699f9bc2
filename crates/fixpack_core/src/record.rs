/// A fixed-width record whose byte layout is agreed with the consumer.
pub trait PackedRecord: Clone {
    /// Serialized size; `write_le` must emit exactly this many bytes.
    const SIZE: usize;
    /// Struct name used in the header form.
    const C_TYPE: &'static str;

    /// The all-zero record occupying unfilled slots.
    fn empty() -> Self;

    fn key(&self) -> u16;

    fn write_le(&self, out: &mut Vec<u8>);

    /// Inverse of `write_le`; `None` if `buf` is shorter than `SIZE`.
    fn read_le(buf: &[u8]) -> Option<Self>;

    /// Initializer values in field order, for `{a,b,c}` in the header form.
    fn c_fields(&self) -> Vec<String>;

    fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        self.write_le(&mut out);
        debug_assert_eq!(out.len(), Self::SIZE);
        out
    }
}
