//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// Index plus generation: a destroyed entity's slot can be recycled, but the
    /// old handle never aliases the new occupant.
    pub struct Entity;
}

impl Entity {
    /// Stable 64-bit form, for logs and rapier user data
    pub fn to_bits(self) -> u64 {
        slotmap::Key::data(&self).as_ffi()
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits = self.to_bits();
        write!(f, "{}v{}", bits & 0xffff_ffff, bits >> 32)
    }
}
