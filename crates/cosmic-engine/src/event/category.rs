use bitflags::bitflags;

bitflags! {
    /// Event category bitmask.
    ///
    /// Key and mouse events also carry `INPUT`, so a single `INPUT` test
    /// selects every device event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Category: u8 {
        const APPLICATION  = 1 << 0;
        const WINDOW       = 1 << 1;
        const INPUT        = 1 << 2;
        const KEYBOARD     = 1 << 3;
        const MOUSE        = 1 << 4;
        const MOUSE_BUTTON = 1 << 5;
    }
}

impl Category {
    /// True when at least one bit of `mask` is set in `self`.
    ///
    /// An empty category or an empty mask never matches.
    pub fn matches(self, mask: Category) -> bool {
        self.intersects(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_category_matches_nothing() {
        assert!(!Category::empty().matches(Category::empty()));
        assert!(!Category::empty().matches(Category::all()));
    }

    #[test]
    fn empty_mask_never_matches() {
        assert!(!Category::INPUT.matches(Category::empty()));
    }

    #[test]
    fn any_shared_bit_matches() {
        let key = Category::INPUT | Category::KEYBOARD;
        assert!(key.matches(Category::KEYBOARD));
        assert!(key.matches(Category::KEYBOARD | Category::MOUSE));
        assert!(!key.matches(Category::MOUSE | Category::WINDOW));
    }
}
