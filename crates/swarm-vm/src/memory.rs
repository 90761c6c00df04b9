//! Bounds-checked memory regions.
//!
//! The three byte regions an instruction can address, with typed accessors
//! that validate offset + width against the region length before every
//! access. Operand bytes are reinterpreted native-endian, matching hosts
//! that lay regions out with plain structs.

use crate::error::VmError;
use crate::layout::ScopeId;

/// The region views for one work unit: shared global memory, the current
/// work-unit window, and the VM-owned local scratch.
pub(crate) struct Regions<'a> {
    pub global: &'a mut [u8],
    pub work: &'a mut [u8],
    pub local: &'a mut [u8],
}

impl Regions<'_> {
    fn slot(&mut self, scope: u8, offset: u8, width: usize) -> Result<&mut [u8], VmError> {
        let id = ScopeId::from_byte(scope).ok_or(VmError::InvalidScopeId { scope })?;
        let region: &mut [u8] = match id {
            ScopeId::Global => &mut *self.global,
            ScopeId::Work => &mut *self.work,
            ScopeId::Local => &mut *self.local,
        };
        let len = region.len();
        let start = offset as usize;
        region
            .get_mut(start..start + width)
            .ok_or(VmError::OutOfBoundsOffset {
                scope: id,
                offset,
                width,
                len,
            })
    }

    pub fn read_f32(&mut self, pair: (u8, u8)) -> Result<f32, VmError> {
        let bytes = self.slot(pair.0, pair.1, 4)?;
        Ok(f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn write_f32(&mut self, pair: (u8, u8), value: f32) -> Result<(), VmError> {
        let bytes = self.slot(pair.0, pair.1, 4)?;
        bytes.copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    pub fn read_i32(&mut self, pair: (u8, u8)) -> Result<i32, VmError> {
        let bytes = self.slot(pair.0, pair.1, 4)?;
        Ok(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn write_i32(&mut self, pair: (u8, u8), value: i32) -> Result<(), VmError> {
        let bytes = self.slot(pair.0, pair.1, 4)?;
        bytes.copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    pub fn read_u32(&mut self, pair: (u8, u8)) -> Result<u32, VmError> {
        let bytes = self.slot(pair.0, pair.1, 4)?;
        Ok(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn write_u32(&mut self, pair: (u8, u8), value: u32) -> Result<(), VmError> {
        let bytes = self.slot(pair.0, pair.1, 4)?;
        bytes.copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    /// Booleans are one byte; any non-zero value is true.
    pub fn read_bool(&mut self, pair: (u8, u8)) -> Result<bool, VmError> {
        let bytes = self.slot(pair.0, pair.1, 1)?;
        Ok(bytes[0] != 0)
    }

    pub fn write_bool(&mut self, pair: (u8, u8), value: bool) -> Result<(), VmError> {
        let bytes = self.slot(pair.0, pair.1, 1)?;
        bytes[0] = u8::from(value);
        Ok(())
    }
}
