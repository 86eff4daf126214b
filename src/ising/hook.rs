use std::slice::Chunks;

/// Read-only view of the spin grid handed to hooks.
///
/// Rows follow the site enumeration: row `r` holds the sites with
/// `i = r - N`, column `c` the sites with `j = c - N`.
#[derive(Debug, Clone, Copy)]
pub struct SpinView<'a> {
    spins: &'a [i8],
    side: usize,
    step: u64,
    magnetization: f64,
}

impl<'a> SpinView<'a> {
    pub(crate) fn new(spins: &'a [i8], side: usize, step: u64, magnetization: f64) -> Self {
        debug_assert_eq!(spins.len(), side * side);
        Self {
            spins,
            side,
            step,
            magnetization,
        }
    }

    /// Step number the view was taken at (0-based)
    pub fn step(&self) -> u64 {
        self.step
    }

    /// `2N + 1`
    pub fn side(&self) -> usize {
        self.side
    }

    /// Mean spin at this step
    pub fn magnetization(&self) -> f64 {
        self.magnetization
    }

    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.spins[row * self.side + col]
    }

    pub fn rows(&self) -> Chunks<'a, i8> {
        self.spins.chunks(self.side)
    }

    pub fn as_slice(&self) -> &'a [i8] {
        self.spins
    }

    /// Owned copy of the grid
    pub fn to_grid(&self) -> Vec<Vec<i8>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}

/// Observer called by the engine at fixed step intervals.
///
/// Both callbacks only ever see a frozen view; they cannot influence the
/// simulation. Implementations should treat I/O failures as best-effort.
pub trait SnapshotHook {
    /// Live display, called every render interval
    fn render(&mut self, _view: &SpinView<'_>) {}

    /// Persistence, called every snapshot interval
    fn persist(&mut self, _view: &SpinView<'_>) {}
}

/// Hook that ignores every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl SnapshotHook for NoopHook {}

impl<H: SnapshotHook + ?Sized> SnapshotHook for &mut H {
    fn render(&mut self, view: &SpinView<'_>) {
        (**self).render(view);
    }

    fn persist(&mut self, view: &SpinView<'_>) {
        (**self).persist(view);
    }
}

impl<H: SnapshotHook + ?Sized> SnapshotHook for Box<H> {
    fn render(&mut self, view: &SpinView<'_>) {
        (**self).render(view);
    }

    fn persist(&mut self, view: &SpinView<'_>) {
        (**self).persist(view);
    }
}

impl<A: SnapshotHook, B: SnapshotHook> SnapshotHook for (A, B) {
    fn render(&mut self, view: &SpinView<'_>) {
        self.0.render(view);
        self.1.render(view);
    }

    fn persist(&mut self, view: &SpinView<'_>) {
        self.0.persist(view);
        self.1.persist(view);
    }
}

impl<H: SnapshotHook> SnapshotHook for Option<H> {
    fn render(&mut self, view: &SpinView<'_>) {
        if let Some(hook) = self {
            hook.render(view);
        }
    }

    fn persist(&mut self, view: &SpinView<'_>) {
        if let Some(hook) = self {
            hook.persist(view);
        }
    }
}
