//! Environment with static wall obstacles.

use super::{DisplayTransform, GeometryError, Pixel, Position, Shape};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct LineSegment {
    p1: Position,
    p2: Position,
}

impl LineSegment {
    pub fn new(p1: Position, p2: Position) -> Result<Self, GeometryError> {
        let segment = Self { p1, p2 };
        segment.shape().validate()?;
        Ok(segment)
    }

    pub fn p1(&self) -> Position {
        self.p1
    }

    pub fn p2(&self) -> Position {
        self.p2
    }

    pub fn shape(&self) -> Shape {
        Shape::Segment {
            p1: self.p1,
            p2: self.p2,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Environment {
    walls: Vec<LineSegment>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walls(&self) -> &[LineSegment] {
        &self.walls
    }

    pub fn shapes(&self) -> impl Iterator<Item = Shape> + '_ {
        self.walls.iter().map(LineSegment::shape)
    }

    pub fn add_line_segment(&mut self, p1: Position, p2: Position) -> Result<(), GeometryError> {
        self.walls.push(LineSegment::new(p1, p2)?);
        Ok(())
    }

    /// Adds the bottom, right, top and left edge of the axis-aligned rectangle spanned by two
    /// opposite corners. Nothing is added if the rectangle is degenerate.
    pub fn add_rectangle(&mut self, c1: Position, c2: Position) -> Result<(), GeometryError> {
        let c3 = Position::new(c2.x(), c1.y());
        let c4 = Position::new(c1.x(), c2.y());
        let edges = [
            LineSegment::new(c1, c3)?,
            LineSegment::new(c3, c2)?,
            LineSegment::new(c2, c4)?,
            LineSegment::new(c4, c1)?,
        ];
        self.walls.extend(edges);
        Ok(())
    }

    pub fn add_line_segment_pixel(
        &mut self,
        transform: &DisplayTransform,
        p1: Pixel,
        p2: Pixel,
    ) -> Result<(), GeometryError> {
        self.add_line_segment(transform.to_world(p1), transform.to_world(p2))
    }

    pub fn add_rectangle_pixel(
        &mut self,
        transform: &DisplayTransform,
        c1: Pixel,
        c2: Pixel,
    ) -> Result<(), GeometryError> {
        self.add_rectangle(transform.to_world(c1), transform.to_world(c2))
    }
}
