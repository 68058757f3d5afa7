use crate::MalformedDescriptor;

/// A cursor over an immutable byte slice, producing `MalformedDescriptor`
/// instead of panicking on truncated input.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], MalformedDescriptor> {
        if self.pos + n > self.buf.len() {
            return Err(MalformedDescriptor("unexpected end of input".to_string()));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, MalformedDescriptor> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, MalformedDescriptor> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn u32(&mut self) -> Result<u32, MalformedDescriptor> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn u64(&mut self) -> Result<u64, MalformedDescriptor> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn i64(&mut self) -> Result<i64, MalformedDescriptor> {
        Ok(i64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn utf8_string(&mut self, len: usize) -> Result<String, MalformedDescriptor> {
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| MalformedDescriptor("field is not valid UTF-8".to_string()))
    }
}
