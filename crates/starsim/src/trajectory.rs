//! Pre-sized trajectory table of pixel positions.
//!
//! [`TrajectoryRecord`] holds one [`Pixel`] per body per step in a single flat
//! buffer allocated up front. Steps are written strictly in order, each
//! exactly once; readers pull frames through [`TrajectoryRecord::frame`],
//! [`TrajectoryRecord::frames`] or a [`FrameView`] cursor.
//!
//! On disk the table is a nested array, one entry per recorded step:
//!
//! ```json
//! [[[49, 50], [50, 49], [50, 51], [51, 50]], ...]
//! ```

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::error::{Axis, OutOfRangeWarning, TrajectoryError};

/// Largest representable pixel coordinate
const PIXEL_MAX: f64 = u16::MAX as f64;

/// A position in canvas pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub x: u16,
    pub y: u16,
}

impl Pixel {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Rounds one coordinate to the nearest pixel, clamping into `[0, 65535]`
///
/// Returns the rounded, unclamped value alongside when clamping was needed.
fn to_pixel(coordinate: f64) -> (u16, Option<f64>) {
    let rounded = coordinate.round();
    if (0.0..=PIXEL_MAX).contains(&rounded) {
        (rounded as u16, None)
    } else {
        // NaN casts to 0
        (rounded.clamp(0.0, PIXEL_MAX) as u16, Some(rounded))
    }
}

/// `step_count × body_count` table of recorded pixel positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<[u16; 2]>>", try_from = "Vec<Vec<[u16; 2]>>")]
pub struct TrajectoryRecord {
    cells: Vec<Pixel>,
    step_count: usize,
    body_count: usize,
    steps_recorded: usize,
}

impl TrajectoryRecord {
    /// Number of cells a table of this shape holds, `None` on overflow
    pub fn cell_count(step_count: usize, body_count: usize) -> Option<usize> {
        step_count.checked_mul(body_count)
    }

    /// Allocates the whole table; nothing is recorded yet
    ///
    /// # Panics
    ///
    /// If `step_count * body_count` overflows. [`Simulation::new`] rejects
    /// such shapes with [`ConfigError::TableTooLarge`] before allocating.
    ///
    /// [`Simulation::new`]: crate::simulation::Simulation::new
    /// [`ConfigError::TableTooLarge`]: crate::error::ConfigError::TableTooLarge
    pub fn new(step_count: usize, body_count: usize) -> Self {
        Self {
            cells: vec![Pixel::default(); step_count * body_count],
            step_count,
            body_count,
            steps_recorded: 0,
        }
    }

    /// Writes the positions of `bodies` as frame `step`
    ///
    /// `step` must be the next unwritten step. Coordinates are rounded to the
    /// nearest pixel; any that fall outside the `u16` range are clamped and
    /// returned as warnings.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::{Point2, Vector2};
    /// use starsim::body::Body;
    /// use starsim::trajectory::{Pixel, TrajectoryRecord};
    ///
    /// let bodies = [Body::new(Point2::new(10.4, 20.6), Vector2::zeros(), 1.0).unwrap()];
    /// let mut record = TrajectoryRecord::new(2, 1);
    ///
    /// let warnings = record.record(0, &bodies).unwrap();
    /// assert!(warnings.is_empty());
    /// assert_eq!(record.frame(0), Some(&[Pixel::new(10, 21)][..]));
    ///
    /// // Steps are written in order
    /// assert!(record.record(0, &bodies).is_err());
    /// ```
    pub fn record(
        &mut self,
        step: usize,
        bodies: &[Body],
    ) -> Result<Vec<OutOfRangeWarning>, TrajectoryError> {
        if self.steps_recorded == self.step_count {
            return Err(TrajectoryError::Full {
                step_count: self.step_count,
            });
        }
        if step != self.steps_recorded {
            return Err(TrajectoryError::OutOfOrder {
                expected: self.steps_recorded,
                got: step,
            });
        }
        if bodies.len() != self.body_count {
            return Err(TrajectoryError::BodyCountMismatch {
                expected: self.body_count,
                got: bodies.len(),
            });
        }

        let mut warnings = Vec::new();
        let start = step * self.body_count;
        let row = &mut self.cells[start..start + self.body_count];

        for (index, (cell, body)) in row.iter_mut().zip(bodies).enumerate() {
            let (x, x_overflow) = to_pixel(body.position.x);
            let (y, y_overflow) = to_pixel(body.position.y);
            *cell = Pixel::new(x, y);

            warnings.extend(
                [(Axis::X, x_overflow), (Axis::Y, y_overflow)]
                    .into_iter()
                    .filter_map(|(axis, value)| {
                        value.map(|value| OutOfRangeWarning {
                            step,
                            body: index,
                            axis,
                            value,
                        })
                    }),
            );
        }

        self.steps_recorded += 1;
        Ok(warnings)
    }

    /// Pixels of a recorded step, `None` if the step has not been written
    pub fn frame(&self, step: usize) -> Option<&[Pixel]> {
        (step < self.steps_recorded).then(|| self.row(step))
    }

    /// Pixel of one body at one recorded step
    pub fn get(&self, step: usize, body: usize) -> Option<Pixel> {
        self.frame(step)?.get(body).copied()
    }

    /// Every recorded frame, in step order
    pub fn frames(&self) -> impl Iterator<Item = &[Pixel]> + '_ {
        (0..self.steps_recorded).map(move |step| self.row(step))
    }

    /// Read-only cursor starting at step 0
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            record: self,
            cursor: 0,
        }
    }

    fn row(&self, step: usize) -> &[Pixel] {
        let start = step * self.body_count;
        &self.cells[start..start + self.body_count]
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn body_count(&self) -> usize {
        self.body_count
    }

    pub fn steps_recorded(&self) -> usize {
        self.steps_recorded
    }

    /// True once every step has been written
    pub fn is_complete(&self) -> bool {
        self.steps_recorded == self.step_count
    }

    /// Number of cells in the table, recorded or not
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<TrajectoryRecord> for Vec<Vec<[u16; 2]>> {
    fn from(record: TrajectoryRecord) -> Self {
        record
            .frames()
            .map(|frame| frame.iter().map(|p| [p.x, p.y]).collect())
            .collect()
    }
}

impl TryFrom<Vec<Vec<[u16; 2]>>> for TrajectoryRecord {
    type Error = TrajectoryError;

    /// Rebuilds a complete table, rejecting frames of unequal width
    fn try_from(frames: Vec<Vec<[u16; 2]>>) -> Result<Self, Self::Error> {
        let body_count = frames.first().map_or(0, Vec::len);

        let cells = frames
            .iter()
            .enumerate()
            .map(|(step, frame)| {
                if frame.len() == body_count {
                    Ok(frame.iter().map(|&[x, y]| Pixel::new(x, y)))
                } else {
                    Err(TrajectoryError::Ragged {
                        step,
                        expected: body_count,
                        got: frame.len(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();

        Ok(Self {
            cells,
            step_count: frames.len(),
            body_count,
            steps_recorded: frames.len(),
        })
    }
}

/// Pull-based, read-only cursor over the recorded frames
///
/// ```
/// use starsim::trajectory::TrajectoryRecord;
///
/// let record = TrajectoryRecord::try_from(vec![vec![[1u16, 2]], vec![[3, 4]]]).unwrap();
/// let mut view = record.view();
///
/// assert_eq!(view.remaining(), 2);
/// let (step, frame) = view.next_frame().unwrap();
/// assert_eq!((step, frame[0].x), (0, 1));
///
/// view.seek(0);
/// assert_eq!(view.remaining(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    record: &'a TrajectoryRecord,
    cursor: usize,
}

impl<'a> FrameView<'a> {
    /// Returns the next recorded frame and its step, advancing the cursor
    pub fn next_frame(&mut self) -> Option<(usize, &'a [Pixel])> {
        let step = self.cursor;
        let frame = self.record.frame(step)?;
        self.cursor += 1;
        Some((step, frame))
    }

    /// Moves the cursor to `step`; returns false (cursor unchanged) past the
    /// recorded range
    pub fn seek(&mut self, step: usize) -> bool {
        if step <= self.record.steps_recorded() {
            self.cursor = step;
            true
        } else {
            false
        }
    }

    /// Frames left before the end of the recorded range
    pub fn remaining(&self) -> usize {
        self.record.steps_recorded().saturating_sub(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl<'a> Iterator for FrameView<'a> {
    type Item = (usize, &'a [Pixel]);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}
