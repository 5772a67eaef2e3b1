use super::{A3dParseContext, A3dParseError, Result};
use nom::{
    bytes::complete::{take, take_till},
    number::complete::{le_f32, le_i32, le_u16, le_u32, le_u8},
    Err, IResult,
};

/// Number of filler bytes needed to move `length` up to the next multiple of 4.
///
/// ```
/// use a3d::parsers::primitive::padding_for;
///
/// assert_eq!(padding_for(13), 3);
/// assert_eq!(padding_for(16), 0);
/// ```
pub fn padding_for(length: usize) -> usize {
    (4 - length % 4) % 4
}

/// A fixed-width little-endian value that can be read straight from the stream.
pub(crate) trait A3dPrimitive: Sized {
    /// Size in bytes of one value.
    const SIZE: usize;

    fn parse(input: &[u8]) -> IResult<&[u8], Self, ()>;
}

impl A3dPrimitive for u8 {
    const SIZE: usize = 1;

    fn parse(input: &[u8]) -> IResult<&[u8], Self, ()> {
        le_u8::<()>(input)
    }
}

impl A3dPrimitive for u16 {
    const SIZE: usize = 2;

    fn parse(input: &[u8]) -> IResult<&[u8], Self, ()> {
        le_u16::<()>(input)
    }
}

impl A3dPrimitive for u32 {
    const SIZE: usize = 4;

    fn parse(input: &[u8]) -> IResult<&[u8], Self, ()> {
        le_u32::<()>(input)
    }
}

impl A3dPrimitive for i32 {
    const SIZE: usize = 4;

    fn parse(input: &[u8]) -> IResult<&[u8], Self, ()> {
        le_i32::<()>(input)
    }
}

impl A3dPrimitive for f32 {
    const SIZE: usize = 4;

    fn parse(input: &[u8]) -> IResult<&[u8], Self, ()> {
        le_f32::<()>(input)
    }
}

impl<'a> A3dParseContext<'a> {
    pub(crate) fn truncated(&self, input: &[u8], needed: usize) -> Err<A3dParseError> {
        Err::Failure(A3dParseError::TruncatedStream {
            offset: self.offset(input),
            needed,
            available: input.len(),
        })
    }

    pub(crate) fn read<T: A3dPrimitive>(&self, input: &'a [u8]) -> Result<'a, T> {
        T::parse(input).map_err(|_| self.truncated(input, T::SIZE))
    }

    /// Reads `count` consecutive values. The length is checked up front so a corrupted count
    /// can't make us allocate more than the input could ever hold.
    pub(crate) fn read_fixed<T: A3dPrimitive>(
        &self,
        input: &'a [u8],
        count: usize,
    ) -> Result<'a, Vec<T>> {
        let needed = count
            .checked_mul(T::SIZE)
            .ok_or_else(|| self.truncated(input, usize::MAX))?;
        if input.len() < needed {
            return Err(self.truncated(input, needed));
        }

        let mut values = Vec::with_capacity(count);
        let mut next_input = input;
        for _ in 0..count {
            let (input, value) = self.read::<T>(next_input)?;
            values.push(value);
            next_input = input;
        }

        Ok((next_input, values))
    }

    pub(crate) fn read_f32s<const N: usize>(&self, input: &'a [u8]) -> Result<'a, [f32; N]> {
        let mut values = [0.0; N];
        let mut next_input = input;
        for value in values.iter_mut() {
            let (input, v) = self.read::<f32>(next_input)?;
            *value = v;
            next_input = input;
        }

        Ok((next_input, values))
    }

    pub(crate) fn skip(&self, input: &'a [u8], len: usize) -> Result<'a, ()> {
        let (input, _) = take::<_, _, ()>(len)(input).map_err(|_| self.truncated(input, len))?;
        Ok((input, ()))
    }

    /// Consumes the filler bytes that realign the stream after `length` bytes of data.
    pub(crate) fn skip_padding(&self, input: &'a [u8], length: usize) -> Result<'a, ()> {
        self.skip(input, padding_for(length))
    }

    fn utf8(&self, start: &'a [u8], bytes: &'a [u8]) -> std::result::Result<String, Err<A3dParseError>> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|source| {
                Err::Failure(A3dParseError::InvalidEncoding {
                    offset: self.offset(start),
                    source,
                })
            })
    }

    /// A string terminated by a `0x00` byte. The terminator is consumed but not returned.
    pub(crate) fn null_terminated_string(&self, input: &'a [u8]) -> Result<'a, String> {
        let (rest, bytes) = take_till::<_, _, ()>(|b: u8| b == 0)(input)
            .map_err(|_| self.truncated(input, 1))?;
        if rest.is_empty() {
            return Err(self.truncated(rest, 1));
        }

        let string = self.utf8(input, bytes)?;
        let (rest, _) = self.skip(rest, 1)?;

        Ok((rest, string))
    }

    /// A `u32` byte length, that many UTF-8 bytes, then padding up to a multiple of 4.
    pub(crate) fn length_prefixed_string(&self, input: &'a [u8]) -> Result<'a, String> {
        let (rest, length) = self.read::<u32>(input)?;
        let length = length as usize;
        let (after, bytes) =
            take::<_, _, ()>(length)(rest).map_err(|_| self.truncated(rest, length))?;

        let string = self.utf8(rest, bytes)?;
        let (after, _) = self.skip_padding(after, length)?;

        Ok((after, string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length_prefixed(s: &str) -> Vec<u8> {
        let mut data = (s.len() as u32).to_le_bytes().to_vec();
        data.extend_from_slice(s.as_bytes());
        data.resize(data.len() + padding_for(s.len()), 0);
        data
    }

    #[test]
    fn padding_rounds_up_to_four() {
        for n in 0..64 {
            let p = padding_for(n);
            assert!(p < 4);
            assert_eq!((n + p) % 4, 0);
            assert_eq!(p == 0, n % 4 == 0);
        }
        assert_eq!(padding_for(13), 3);
        assert_eq!(padding_for(16), 0);
    }

    #[test]
    fn length_prefixed_strings_round_trip() {
        for s in &["", "a", "abcd", "Hull", "Zöllner ß", "名前のある素材"] {
            let mut data = length_prefixed(s);
            data.extend_from_slice(&[0xAA, 0xBB]);

            let ctx = A3dParseContext::new(&data);
            let (rest, decoded) = ctx.length_prefixed_string(&data).unwrap();
            assert_eq!(&decoded, s);
            assert_eq!(rest, &[0xAA, 0xBB]);
        }
    }

    #[test]
    fn null_terminated_string_stops_at_terminator() {
        let data = b"Red\0rest";
        let ctx = A3dParseContext::new(data);
        let (rest, s) = ctx.null_terminated_string(data).unwrap();
        assert_eq!(s, "Red");
        assert_eq!(rest, b"rest");
    }

    #[test]
    fn null_terminated_string_without_terminator_is_truncated() {
        let data = b"Red";
        let ctx = A3dParseContext::new(data);
        match ctx.null_terminated_string(data) {
            Err(Err::Failure(A3dParseError::TruncatedStream { offset, .. })) => {
                assert_eq!(offset, 3)
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn invalid_utf8_is_reported_with_offset() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0xC3, 0x28, 0, 0];
        let ctx = A3dParseContext::new(&data);
        let (input, _) = ctx.read::<u32>(&data).unwrap();
        match ctx.length_prefixed_string(input) {
            Err(Err::Failure(A3dParseError::InvalidEncoding { offset, .. })) => {
                assert_eq!(offset, 8)
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn read_fixed_checks_length_before_reading() {
        let data = [1, 0, 2, 0, 3];
        let ctx = A3dParseContext::new(&data);

        let (rest, values) = ctx.read_fixed::<u16>(&data, 2).unwrap();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(rest, &[3]);

        match ctx.read_fixed::<u16>(&data, 3) {
            Err(Err::Failure(A3dParseError::TruncatedStream {
                offset,
                needed,
                available,
            })) => {
                assert_eq!((offset, needed, available), (0, 6, 5));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn read_fixed_rejects_absurd_counts() {
        let data = [0u8; 8];
        let ctx = A3dParseContext::new(&data);
        assert!(matches!(
            ctx.read_fixed::<f32>(&data, usize::MAX / 2),
            Err(Err::Failure(A3dParseError::TruncatedStream { .. }))
        ));
    }
}
