// crates/trellis-core/src/units.rs
use glam::Vec2;

use crate::{Result, TrellisError};

/// Resolve axis. Units are one-dimensional; the axis picks which extent of the
/// sizing context they read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Closed set of unit variants. Resolution dispatches over this in one place,
/// including the layout-scope legality checks for `Hug` and the spacing units.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    /// Fixed pixel value. Never marks the owning node dynamic.
    Pixels(f32),
    /// Fraction of the parent extent on the resolve axis (0.5 == 50%).
    Percent(f32),
    /// Fraction of the owning node's own just-resolved extent.
    SelfPercent(f32),
    /// Binary operation over two child units, resolved with the same context.
    Op {
        lhs: Box<Unit>,
        op: UnitOp,
        rhs: Box<Unit>,
    },
    /// Content-driven sizing. Only legal on a layout; the layout increments the
    /// cache with its potential extent before the unit is read.
    Hug,
    /// Leftover-space distribution across a layout's children. The effective
    /// value is written by the layout's update-units step.
    SpaceBetween,
    /// Like `SpaceBetween`, but with a leading and trailing gap as well.
    SpaceEvenly,
}

/// Context handed to [`Unit::resolve`]: the parent (or composition fallback)
/// size, the owning node's size as resolved so far, the axis, and whether the
/// owning node is a layout.
#[derive(Debug, Clone, Copy)]
pub struct ResolveCtx<'a> {
    pub parent: Vec2,
    pub own: Vec2,
    pub axis: Axis,
    pub in_layout: bool,
    /// Owning node's name, for usage-error diagnostics.
    pub node: &'a str,
}

impl<'a> ResolveCtx<'a> {
    fn parent_extent(&self) -> f32 {
        match self.axis {
            Axis::X => self.parent.x,
            Axis::Y => self.parent.y,
        }
    }

    fn own_extent(&self) -> f32 {
        match self.axis {
            Axis::X => self.own.x,
            Axis::Y => self.own.y,
        }
    }

    fn require_layout(&self, unit: &'static str) -> Result<()> {
        if self.in_layout {
            Ok(())
        } else {
            Err(TrellisError::LayoutScopedUnit {
                unit,
                node: self.node.to_string(),
            })
        }
    }
}

/// Outcome of one resolution: the pixel value and whether the unit depends on
/// parent or content size (and therefore requires a second layout pass).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub value: f32,
    pub dynamic: bool,
}

/// A declarative length. Holds the unresolved input in `kind` and the last
/// resolved pixel value in `cached`. Cloning is deep: boxed operands are cloned
/// and the copy's cache is independent from then on.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub kind: UnitKind,
    cached: f32,
}

impl Unit {
    pub fn new(kind: UnitKind) -> Self {
        let cached = match kind {
            UnitKind::Pixels(v) => v,
            _ => 0.0,
        };
        Self { kind, cached }
    }

    /// Last resolved pixel value.
    pub fn cached(&self) -> f32 {
        self.cached
    }

    /// Out-of-band write to the cache, bypassing [`Unit::resolve`]. Used by the
    /// layout spacing distribution and by `Modifier::animate`; those are the
    /// only sanctioned writers besides resolution itself.
    pub fn write_resolved(&mut self, value: f32) {
        self.cached = value;
    }

    /// Resolves the unit to pixels for the given context and writes the cache.
    /// Idempotent for a fixed context; must be re-run whenever context changes.
    pub fn resolve(&mut self, ctx: ResolveCtx) -> Result<Resolved> {
        let resolved = match &mut self.kind {
            UnitKind::Pixels(v) => Resolved {
                value: *v,
                dynamic: false,
            },
            UnitKind::Percent(f) => Resolved {
                value: *f * ctx.parent_extent(),
                dynamic: true,
            },
            UnitKind::SelfPercent(f) => Resolved {
                value: *f * ctx.own_extent(),
                dynamic: true,
            },
            UnitKind::Op { lhs, op, rhs } => {
                let l = lhs.resolve(ctx)?;
                let r = rhs.resolve(ctx)?;
                // Division by a zero-resolving operand follows IEEE-754; the
                // caller clamps if it cares.
                let value = match op {
                    UnitOp::Add => l.value + r.value,
                    UnitOp::Sub => l.value - r.value,
                    UnitOp::Mul => l.value * r.value,
                    UnitOp::Div => l.value / r.value,
                };
                Resolved {
                    value,
                    dynamic: l.dynamic || r.dynamic,
                }
            }
            UnitKind::Hug => {
                ctx.require_layout("hug")?;
                Resolved {
                    value: self.cached,
                    dynamic: true,
                }
            }
            UnitKind::SpaceBetween => {
                ctx.require_layout("space-between")?;
                Resolved {
                    value: self.cached,
                    dynamic: true,
                }
            }
            UnitKind::SpaceEvenly => {
                ctx.require_layout("space-evenly")?;
                Resolved {
                    value: self.cached,
                    dynamic: true,
                }
            }
        };
        self.cached = resolved.value;
        Ok(resolved)
    }

    /// Zeroes every `Hug` leaf's cache. Run once per compose before the
    /// potential-size pass so accumulation starts fresh.
    pub fn reset_hug(&mut self) {
        match &mut self.kind {
            UnitKind::Hug => self.cached = 0.0,
            UnitKind::Op { lhs, rhs, .. } => {
                lhs.reset_hug();
                rhs.reset_hug();
            }
            _ => {}
        }
    }

    /// Adds a layout's potential extent into every `Hug` leaf, rounding each to
    /// the nearest integer pixel. The increment (rather than overwrite) keeps
    /// compound units like `hug() + px(8.0)` working. Returns true when a hug
    /// leaf was found.
    pub fn accumulate_hug(&mut self, content: f32) -> bool {
        match &mut self.kind {
            UnitKind::Hug => {
                self.cached = (self.cached + content).round();
                true
            }
            UnitKind::Op { lhs, rhs, .. } => {
                let l = lhs.accumulate_hug(content);
                let r = rhs.accumulate_hug(content);
                l || r
            }
            _ => false,
        }
    }

    fn op(self, op: UnitOp, rhs: Unit) -> Unit {
        Unit::new(UnitKind::Op {
            lhs: Box::new(self),
            op,
            rhs: Box::new(rhs),
        })
    }
}

/// Fixed pixel unit.
pub fn px(value: f32) -> Unit {
    Unit::new(UnitKind::Pixels(value))
}

/// Fraction of the parent extent (0.5 == 50%).
pub fn percent(fraction: f32) -> Unit {
    Unit::new(UnitKind::Percent(fraction))
}

/// Fraction of the owning node's own extent.
pub fn self_percent(fraction: f32) -> Unit {
    Unit::new(UnitKind::SelfPercent(fraction))
}

/// Content-driven sizing for layouts.
pub fn hug() -> Unit {
    Unit::new(UnitKind::Hug)
}

pub fn space_between() -> Unit {
    Unit::new(UnitKind::SpaceBetween)
}

pub fn space_evenly() -> Unit {
    Unit::new(UnitKind::SpaceEvenly)
}

impl std::ops::Add for Unit {
    type Output = Unit;
    fn add(self, rhs: Unit) -> Unit {
        self.op(UnitOp::Add, rhs)
    }
}

impl std::ops::Sub for Unit {
    type Output = Unit;
    fn sub(self, rhs: Unit) -> Unit {
        self.op(UnitOp::Sub, rhs)
    }
}

impl std::ops::Mul for Unit {
    type Output = Unit;
    fn mul(self, rhs: Unit) -> Unit {
        self.op(UnitOp::Mul, rhs)
    }
}

impl std::ops::Div for Unit {
    type Output = Unit;
    fn div(self, rhs: Unit) -> Unit {
        self.op(UnitOp::Div, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(parent: Vec2, own: Vec2, axis: Axis, in_layout: bool) -> ResolveCtx<'static> {
        ResolveCtx {
            parent,
            own,
            axis,
            in_layout,
            node: "test",
        }
    }

    #[test]
    fn pixels_resolve_without_marking_dynamic() {
        let mut unit = px(42.0);
        let r = unit
            .resolve(ctx(Vec2::new(800.0, 600.0), Vec2::ZERO, Axis::X, false))
            .unwrap();
        assert_eq!(r.value, 42.0);
        assert!(!r.dynamic);
        assert_eq!(unit.cached(), 42.0);
    }

    #[test]
    fn percent_resolves_against_parent_axis() {
        let mut unit = percent(0.5);
        let c = ctx(Vec2::new(800.0, 600.0), Vec2::ZERO, Axis::Y, false);
        let r = unit.resolve(c).unwrap();
        assert_eq!(r.value, 300.0);
        assert!(r.dynamic);
    }

    #[test]
    fn self_percent_resolves_against_own_extent() {
        let mut unit = self_percent(0.25);
        let c = ctx(Vec2::new(800.0, 600.0), Vec2::new(200.0, 100.0), Axis::X, false);
        assert_eq!(unit.resolve(c).unwrap().value, 50.0);
    }

    #[test]
    fn operation_combines_and_propagates_dynamic() {
        let mut unit = percent(0.5) + px(10.0);
        let c = ctx(Vec2::new(200.0, 0.0), Vec2::ZERO, Axis::X, false);
        let r = unit.resolve(c).unwrap();
        assert_eq!(r.value, 110.0);
        assert!(r.dynamic);

        let mut constant = px(4.0) * px(3.0);
        let r = constant.resolve(c).unwrap();
        assert_eq!(r.value, 12.0);
        assert!(!r.dynamic);
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        let mut unit = px(10.0) / px(0.0);
        let c = ctx(Vec2::ZERO, Vec2::ZERO, Axis::X, false);
        let r = unit.resolve(c).unwrap();
        assert!(r.value.is_infinite());
    }

    // Copies resolve identically and diverge independently afterwards.
    #[test]
    fn copies_are_independent() {
        let mut original = percent(0.5) + px(5.0);
        let mut copy = original.clone();
        let c = ctx(Vec2::new(100.0, 0.0), Vec2::ZERO, Axis::X, false);
        assert_eq!(
            original.resolve(c).unwrap().value,
            copy.resolve(c).unwrap().value
        );

        copy.write_resolved(999.0);
        assert_eq!(original.resolve(c).unwrap().value, 55.0);
        assert_eq!(original.cached(), 55.0);
    }

    #[test]
    fn hug_outside_layout_is_a_usage_error() {
        let mut unit = hug();
        let c = ctx(Vec2::ZERO, Vec2::ZERO, Axis::X, false);
        match unit.resolve(c) {
            Err(TrellisError::LayoutScopedUnit { unit, node }) => {
                assert_eq!(unit, "hug");
                assert_eq!(node, "test");
            }
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn spacing_outside_layout_is_a_usage_error() {
        let c = ctx(Vec2::ZERO, Vec2::ZERO, Axis::X, false);
        assert!(space_between().resolve(c).is_err());
        assert!(space_evenly().resolve(c).is_err());
    }

    #[test]
    fn hug_accumulates_inside_compound_units() {
        let mut unit = hug() + px(8.0);
        unit.reset_hug();
        assert!(unit.accumulate_hug(70.4));
        let c = ctx(Vec2::ZERO, Vec2::ZERO, Axis::X, true);
        // Hug leaf rounds to 70, the compound adds its constant.
        assert_eq!(unit.resolve(c).unwrap().value, 78.0);
    }

    #[test]
    fn hug_reset_clears_prior_accumulation() {
        let mut unit = hug();
        unit.accumulate_hug(50.0);
        unit.reset_hug();
        unit.accumulate_hug(30.0);
        let c = ctx(Vec2::ZERO, Vec2::ZERO, Axis::X, true);
        assert_eq!(unit.resolve(c).unwrap().value, 30.0);
    }
}
