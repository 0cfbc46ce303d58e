use crate::world::{TextureAtlas, TileIndex};

/// Which row of an object's atlas is playing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationKind {
    #[default]
    Move = 0,
    Attack = 1,
    Death = 2,
}

impl AnimationKind {
    /// Atlas row holding this animation's frames.
    #[inline]
    pub fn row(self) -> usize {
        self as usize
    }
}

/// Frame counter for objects whose atlas lays animations out as rows of
/// frames.
///
/// Switching kind jumps back to frame 0 and holds it for one more
/// `animate`, so every animation is shown from its first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
    kind: AnimationKind,
    frame: usize,
    max_frame: usize,
    restart: bool,
}

impl Animation {
    pub fn new(max_frame: usize) -> Self {
        Self {
            kind: AnimationKind::Move,
            frame: 0,
            max_frame,
            restart: false,
        }
    }

    /// One frame per atlas column.
    pub fn for_atlas(atlas: &TextureAtlas) -> Self {
        Self::new(atlas.horizontal_tiles().saturating_sub(1))
    }

    #[inline]
    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    #[inline]
    pub fn frame(&self) -> usize {
        self.frame
    }

    #[inline]
    pub fn max_frame(&self) -> usize {
        self.max_frame
    }

    #[inline]
    pub fn on_last_frame(&self) -> bool {
        self.frame == self.max_frame
    }

    pub fn set_kind(&mut self, kind: AnimationKind) {
        if kind != self.kind {
            self.kind = kind;
            self.frame = 0;
            self.restart = true;
        }
    }

    /// Advance one frame, wrapping after `max_frame`.
    pub fn animate(&mut self) {
        if self.restart || self.frame >= self.max_frame {
            self.frame = 0;
            self.restart = false;
        } else {
            self.frame += 1;
        }
    }

    #[inline]
    pub fn display_tile(&self) -> TileIndex {
        TileIndex::new(self.frame, self.kind.row())
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_and_wraps() {
        let mut a = Animation::new(3);
        let frames: Vec<usize> = (0..6)
            .map(|_| {
                a.animate();
                a.frame()
            })
            .collect();
        assert_eq!(frames, vec![1, 2, 3, 0, 1, 2]);
    }

    #[test]
    fn kind_change_restarts_from_frame_zero() {
        let mut a = Animation::new(3);
        a.animate();
        a.animate();
        assert_eq!(a.frame(), 2);

        a.set_kind(AnimationKind::Attack);
        assert_eq!(a.frame(), 0);
        a.animate();
        assert_eq!(a.display_tile(), TileIndex::new(0, 1));
        a.set_kind(AnimationKind::Attack);
        a.animate();
        assert_eq!(a.display_tile(), TileIndex::new(1, 1));
    }

    #[test]
    fn same_kind_does_not_restart() {
        let mut a = Animation::new(3);
        a.animate();
        a.set_kind(AnimationKind::Move);
        a.animate();
        assert_eq!(a.frame(), 2);
    }

    #[test]
    fn single_frame_stays_put() {
        let mut a = Animation::new(0);
        a.animate();
        a.animate();
        assert_eq!(a.frame(), 0);
        assert!(a.on_last_frame());
    }

    #[test]
    fn rows_follow_kinds() {
        assert_eq!(AnimationKind::Move.row(), 0);
        assert_eq!(AnimationKind::Attack.row(), 1);
        assert_eq!(AnimationKind::Death.row(), 2);
    }
}
