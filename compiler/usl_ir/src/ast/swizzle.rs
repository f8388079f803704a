//! Vector component selection (`v.xyz`, `c.rgba`).

use std::fmt;

use smallvec::SmallVec;

/// Letter set a swizzle was written with.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SwizzleSet {
    Xyzw,
    Rgba,
    Stpq,
}

impl SwizzleSet {
    fn letters(self) -> [char; 4] {
        match self {
            SwizzleSet::Xyzw => ['x', 'y', 'z', 'w'],
            SwizzleSet::Rgba => ['r', 'g', 'b', 'a'],
            SwizzleSet::Stpq => ['s', 't', 'p', 'q'],
        }
    }
}

/// One to four component indices (0..4) in a single letter set.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Swizzle {
    pub components: SmallVec<[u8; 4]>,
    pub set: SwizzleSet,
}

impl Swizzle {
    /// Parse a member name as a swizzle, or `None` if it is a plain field.
    pub fn parse(name: &str) -> Option<Swizzle> {
        if name.is_empty() || name.len() > 4 {
            return None;
        }
        let first = name.chars().next()?;
        let set = [SwizzleSet::Xyzw, SwizzleSet::Rgba, SwizzleSet::Stpq]
            .into_iter()
            .find(|set| set.letters().contains(&first))?;
        let letters = set.letters();
        let components = name
            .chars()
            .map(|c| {
                letters
                    .iter()
                    .position(|&l| l == c)
                    .and_then(|i| u8::try_from(i).ok())
            })
            .collect::<Option<SmallVec<[u8; 4]>>>()?;
        Some(Swizzle { components, set })
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Display for Swizzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = self.set.letters();
        for &c in &self.components {
            let letter = letters.get(usize::from(c)).copied().unwrap_or('?');
            write!(f, "{letter}")?;
        }
        Ok(())
    }
}
