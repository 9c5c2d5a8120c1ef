use std::fs;
use std::path::{Path, PathBuf};

const TAG_COUNT: usize = 29;
const TAG_INVALID: u16 = 0xFFFF;

struct CaptureSpec {
    declared: u8,
    present: Vec<(usize, u16)>,
    payload: Vec<u8>,
}

impl CaptureSpec {
    fn new(present: Vec<(usize, u16)>, payload_len: u8) -> Self {
        Self {
            declared: TAG_COUNT as u8,
            present,
            payload: (1..=payload_len).collect(),
        }
    }

    fn declared(mut self, declared: u8) -> Self {
        self.declared = declared;
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        let slots = usize::from(self.declared);
        let mut offsets = vec![TAG_INVALID; slots];
        for &(slot, offset) in &self.present {
            if let Some(entry) = offsets.get_mut(slot) {
                *entry = offset;
            }
        }
        let mut out = vec![self.declared];
        for offset in offsets {
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&self.payload);
        out
    }
}

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_capture(
        root.join("ac_basic").join("input.bin"),
        CaptureSpec::new(vec![(0, 0), (1, 3), (7, 5), (28, 9)], 12),
    )?;
    write_capture(
        root.join("ac_sparse").join("input.bin"),
        CaptureSpec::new(vec![(28, 2)], 6),
    )?;
    write_capture(
        root.join("ac_protocol_mismatch").join("input.bin"),
        CaptureSpec::new(vec![(0, 0)], 4).declared(28),
    )?;
    write_capture(
        root.join("ac_non_monotonic").join("input.bin"),
        CaptureSpec::new(vec![(0, 4), (1, 1)], 6),
    )?;
    Ok(())
}

fn write_capture(path: PathBuf, spec: CaptureSpec) -> Result<(), String> {
    ensure_parent(&path)?;
    fs::write(&path, spec.to_bytes())
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn ensure_parent(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }
    Ok(())
}
