//! Access-mask filtering for read-only redirect targets.
//!
//! A read-only hint never changes the file on disk; it only narrows the
//! access a subsequent open of the target may ask for.

pub const GENERIC_READ: u32 = 0x8000_0000;
pub const GENERIC_WRITE: u32 = 0x4000_0000;
pub const GENERIC_EXECUTE: u32 = 0x2000_0000;
pub const GENERIC_ALL: u32 = 0x1000_0000;

pub const FILE_READ_DATA: u32 = 0x0001;
pub const FILE_WRITE_DATA: u32 = 0x0002;
pub const FILE_APPEND_DATA: u32 = 0x0004;
pub const FILE_READ_EA: u32 = 0x0008;
pub const FILE_WRITE_EA: u32 = 0x0010;
pub const FILE_EXECUTE: u32 = 0x0020;
pub const FILE_READ_ATTRIBUTES: u32 = 0x0080;
pub const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;

pub const DELETE: u32 = 0x0001_0000;
pub const READ_CONTROL: u32 = 0x0002_0000;
pub const WRITE_DAC: u32 = 0x0004_0000;
pub const WRITE_OWNER: u32 = 0x0008_0000;
pub const SYNCHRONIZE: u32 = 0x0010_0000;

/// Every right that can modify the target or its metadata.
pub const WRITE_CAPABLE_ACCESS: u32 = GENERIC_WRITE
    | GENERIC_ALL
    | FILE_WRITE_DATA
    | FILE_APPEND_DATA
    | FILE_WRITE_EA
    | FILE_WRITE_ATTRIBUTES
    | DELETE
    | WRITE_DAC
    | WRITE_OWNER;

const READ_CAPABLE_ACCESS: u32 =
    GENERIC_READ | GENERIC_EXECUTE | FILE_READ_DATA | FILE_READ_EA | FILE_EXECUTE | FILE_READ_ATTRIBUTES | READ_CONTROL;

/// Narrow `desired` for a read-only target. Unchanged when `read_only` is
/// false. If stripping leaves nothing readable, `GENERIC_READ` is granted
/// so the open still succeeds for reading.
pub fn restrict_access(desired: u32, read_only: bool) -> u32 {
    if !read_only {
        return desired;
    }
    let mut access = desired & !WRITE_CAPABLE_ACCESS;
    if access & READ_CAPABLE_ACCESS == 0 {
        access |= GENERIC_READ;
    }
    access
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_hint_passes_through() {
        assert_eq!(restrict_access(GENERIC_WRITE, false), GENERIC_WRITE);
    }

    #[test]
    fn write_rights_are_stripped() {
        let asked = GENERIC_READ | GENERIC_WRITE | DELETE | SYNCHRONIZE;
        assert_eq!(restrict_access(asked, true), GENERIC_READ | SYNCHRONIZE);
    }

    #[test]
    fn write_only_request_becomes_read() {
        assert_eq!(restrict_access(FILE_APPEND_DATA | WRITE_DAC, true), GENERIC_READ);
        assert_eq!(restrict_access(GENERIC_ALL, true), GENERIC_READ);
    }
}
