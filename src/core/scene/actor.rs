//=========================================================================
// Actor
//=========================================================================
//
// Node of the scene graph.
//
// Architecture:
//   ActorRef ──Rc<RefCell<ActorNode>>──> ActorNode
//      │                                  ├─ children: Vec<ActorRef>   (owning, sorted by z)
//      │                                  ├─ parent:   WeakActor       (non-owning)
//      │                                  ├─ stage:    WeakActor       (propagated to subtree)
//      │                                  ├─ actions / tasks / listeners
//      │                                  └─ visual:   Box<dyn Visual> (sprite, shape, ...)
//      └─ downgrade() ──> WeakActor
//
// Per-frame flow:
//   update(dt)    → actions → tasks → update callback → visual hook → children
//   render(r)     → children with z < 0 → self → remaining children
//   dispatch(ev)  → children (back to front) → hover/press/click → listeners
//
// Re-entrancy rules: no borrow of a node is held while user code runs
// (callbacks, listeners, actions). Child lists are snapshotted before
// recursion, so callbacks may add or remove actors anywhere in the tree.
//
// Transforms are lazy. Setters only mark the node dirty; reading a matrix
// resolves the ancestor chain root-first, recomputing dirty nodes and
// marking their direct children dirty in turn.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use kurbo::{Affine, Point, Rect, Size, Vec2};
use log::{error, trace, warn};

//=== Internal Dependencies ===============================================

use super::transform::Transform;
use super::visual::Visual;
use crate::core::action::{Action, ActionManager, ActionRef};
use crate::core::error::SceneError;
use crate::core::event::{Event, EventDispatcher, EventListener, EventType, ListenerRef};
use crate::core::render::{Color, Renderer};
use crate::core::task::{TaskManager, TaskRef};

//=== Type Aliases ========================================================

/// Per-frame callback: `(actor, dt)`.
pub type UpdateCallback = Box<dyn FnMut(&ActorRef, f64)>;

//=== ActorNode ===========================================================

/// State of one actor. Only reachable through [`ActorRef`].
pub struct ActorNode {
    //--- Identity ---------------------------------------------------------
    name: String,
    hash_name: u64,

    //--- Geometry ---------------------------------------------------------
    transform: Transform,
    size: Size,
    anchor: Vec2,
    z_order: i32,

    //--- Opacity ----------------------------------------------------------
    opacity: f32,
    displayed_opacity: f32,
    cascade_opacity: bool,

    //--- Flags ------------------------------------------------------------
    visible: bool,
    responsive: bool,
    update_pausing: bool,
    show_border: bool,
    hover: bool,
    pressed: bool,

    //--- Matrix Cache -----------------------------------------------------
    matrix: Affine,
    matrix_inverse: Option<Affine>,
    dirty_transform: bool,
    dirty_inverse: bool,
    fast_transform: bool,

    //--- Tree -------------------------------------------------------------
    parent: Option<WeakActor>,
    children: Vec<ActorRef>,
    stage: Option<WeakActor>,

    //--- Behavior ---------------------------------------------------------
    actions: ActionManager,
    tasks: TaskManager,
    listeners: EventDispatcher,
    on_update: Option<UpdateCallback>,
    visual: Option<Box<dyn Visual>>,
}

impl ActorNode {
    fn new(anchor: Vec2) -> Self {
        Self {
            name: String::new(),
            hash_name: 0,
            transform: Transform::IDENTITY,
            size: Size::ZERO,
            anchor,
            z_order: 0,
            opacity: 1.0,
            displayed_opacity: 1.0,
            cascade_opacity: false,
            visible: true,
            responsive: false,
            update_pausing: false,
            show_border: false,
            hover: false,
            pressed: false,
            matrix: Affine::IDENTITY,
            matrix_inverse: Some(Affine::IDENTITY),
            dirty_transform: true,
            dirty_inverse: true,
            fast_transform: true,
            parent: None,
            children: Vec::new(),
            stage: None,
            actions: ActionManager::new(),
            tasks: TaskManager::new(),
            listeners: EventDispatcher::new(),
            on_update: None,
            visual: None,
        }
    }

    fn local_bounds(&self) -> Rect {
        match &self.visual {
            Some(visual) => visual.bounds(self.size),
            None => Rect::from_origin_size(Point::ZERO, self.size),
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty_transform = true;
    }
}

fn hash_name(name: &str) -> u64 {
    if name.is_empty() {
        return 0;
    }
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

fn invert(matrix: Affine) -> Option<Affine> {
    let det = matrix.determinant();
    if !det.is_finite() || det.abs() <= f64::EPSILON {
        return None;
    }
    Some(matrix.inverse())
}

//=== WeakActor ===========================================================

/// Non-owning actor handle (parent links, stage links, event targets).
#[derive(Clone, Default)]
pub struct WeakActor(Weak<RefCell<ActorNode>>);

impl WeakActor {
    /// Handle that never upgrades.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upgrade(&self) -> Option<ActorRef> {
        self.0.upgrade().map(ActorRef)
    }

    /// Returns `true` if this handle refers to `actor`.
    pub fn points_to(&self, actor: &ActorRef) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&actor.0))
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(actor) => write!(f, "WeakActor({:?})", actor.name()),
            None => write!(f, "WeakActor(<dropped>)"),
        }
    }
}

//=== ActorRef ============================================================

/// Owning handle to an actor.
///
/// Cloning the handle shares the actor. An actor stays alive while its
/// parent or any handle holds it.
///
/// ```
/// use aetheric_stage::core::scene::ActorRef;
/// use kurbo::Point;
///
/// let parent = ActorRef::new();
/// let child = ActorRef::new();
/// parent.set_position(100.0, 50.0);
/// child.set_position(10.0, 10.0);
/// parent.add_child(&child).unwrap();
///
/// assert_eq!(child.transform_matrix() * Point::ZERO, Point::new(110.0, 60.0));
/// ```
#[derive(Clone)]
pub struct ActorRef(Rc<RefCell<ActorNode>>);

impl ActorRef {
    //--- Construction -----------------------------------------------------

    /// Creates a detached actor with anchor (0, 0).
    pub fn new() -> Self {
        Self::with_anchor(0.0, 0.0)
    }

    /// Creates a detached actor with the given anchor.
    pub fn with_anchor(anchor_x: f64, anchor_y: f64) -> Self {
        Self(Rc::new(RefCell::new(ActorNode::new(Vec2::new(anchor_x, anchor_y)))))
    }

    /// Creates a detached actor displaying `visual`.
    pub fn from_visual(visual: impl Visual) -> Self {
        let actor = Self::new();
        actor.set_visual(visual);
        actor
    }

    //--- Identity ---------------------------------------------------------

    pub fn downgrade(&self) -> WeakActor {
        WeakActor(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &ActorRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stable identity (address of the node).
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        let mut node = self.0.borrow_mut();
        if node.name != name {
            node.hash_name = hash_name(&name);
            node.name = name;
        }
    }

    /// Returns `true` if the actor is named `name`.
    pub fn is_name(&self, name: &str) -> bool {
        let node = self.0.borrow();
        node.hash_name == hash_name(name) && node.name == name
    }

    //=====================================================================
    // Hierarchy
    //=====================================================================

    pub fn parent(&self) -> Option<ActorRef> {
        self.0.borrow().parent.as_ref().and_then(WeakActor::upgrade)
    }

    /// Root actor of the stage this actor belongs to.
    pub fn stage(&self) -> Option<ActorRef> {
        self.0.borrow().stage.as_ref().and_then(WeakActor::upgrade)
    }

    /// Snapshot of the children, in z-order.
    pub fn children(&self) -> Vec<ActorRef> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    /// First child named `name`.
    pub fn get_child(&self, name: &str) -> Option<ActorRef> {
        let hash = hash_name(name);
        self.0
            .borrow()
            .children
            .iter()
            .find(|child| {
                let child = child.0.borrow();
                child.hash_name == hash && child.name == name
            })
            .cloned()
    }

    /// All children named `name`.
    pub fn get_children(&self, name: &str) -> Vec<ActorRef> {
        let hash = hash_name(name);
        self.0
            .borrow()
            .children
            .iter()
            .filter(|child| {
                let child = child.0.borrow();
                child.hash_name == hash && child.name == name
            })
            .cloned()
            .collect()
    }

    /// Returns `true` if `self` is a (transitive) ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &ActorRef) -> bool {
        let mut current = other.parent();
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Returns `true` if `self` is a direct child of `parent`.
    pub fn is_child_of(&self, parent: &ActorRef) -> bool {
        self.0
            .borrow()
            .parent
            .as_ref()
            .map_or(false, |p| p.points_to(parent))
    }

    /// Attaches `child` as the last child among its z-order peers.
    ///
    /// Rejected without touching the tree if `child` already has a parent
    /// or if attaching would make an actor its own ancestor.
    pub fn add_child(&self, child: &ActorRef) -> Result<(), SceneError> {
        if child.ptr_eq(self) || child.is_ancestor_of(self) {
            error!(target: "scene", "An actor cannot be its own ancestor ({:?})", child.name());
            return Err(SceneError::Cycle);
        }

        if child.parent().is_some() {
            error!(target: "scene", "The actor to be added already has a parent ({:?})", child.name());
            return Err(SceneError::AlreadyHasParent);
        }

        self.0.borrow_mut().children.push(child.clone());
        {
            let mut node = child.0.borrow_mut();
            node.parent = Some(self.downgrade());
            node.mark_dirty();
        }

        child.set_stage(self.stage().as_ref());
        child.update_opacity();
        child.reorder();
        Ok(())
    }

    /// Adds each child in order, stopping at the first rejection.
    pub fn add_children(&self, children: &[ActorRef]) -> Result<(), SceneError> {
        children.iter().try_for_each(|child| self.add_child(child))
    }

    /// Detaches `child`; clears its parent and stage (recursively).
    pub fn remove_child(&self, child: &ActorRef) -> Result<(), SceneError> {
        if self.take_child(child) {
            Ok(())
        } else {
            warn!(target: "scene", "Actor {:?} is not a child of {:?}", child.name(), self.name());
            Err(SceneError::NotAChild)
        }
    }

    /// Detaches this actor from its parent, if any.
    pub fn remove_from_parent(&self) {
        if let Some(parent) = self.parent() {
            if !parent.take_child(self) {
                trace!(target: "scene", "Actor {:?} was already gone from its parent's children", self.name());
                self.detach();
            }
        }
    }

    /// Detaches every child named `name`; returns how many were removed.
    pub fn remove_children(&self, name: &str) -> usize {
        self.get_children(name)
            .iter()
            .filter(|child| self.take_child(child))
            .count()
    }

    /// Unlinks `child` if it is one of ours; `false` otherwise.
    fn take_child(&self, child: &ActorRef) -> bool {
        let removed = {
            let mut node = self.0.borrow_mut();
            node.children
                .iter()
                .position(|c| c.ptr_eq(child))
                .map(|index| node.children.remove(index))
        };

        match removed {
            Some(removed) => {
                removed.detach();
                true
            }
            None => false,
        }
    }

    pub fn remove_all_children(&self) {
        let removed = std::mem::take(&mut self.0.borrow_mut().children);
        for child in removed {
            child.detach();
        }
    }

    fn detach(&self) {
        {
            let mut node = self.0.borrow_mut();
            node.parent = None;
            node.hover = false;
            node.pressed = false;
            node.mark_dirty();
        }
        self.set_stage(None);
        self.update_opacity();
    }

    pub(crate) fn set_stage(&self, stage: Option<&ActorRef>) {
        let children = {
            let mut node = self.0.borrow_mut();
            node.stage = stage.map(ActorRef::downgrade);
            node.children.clone()
        };
        for child in children {
            child.set_stage(stage);
        }
    }

    //--- Z-Order ----------------------------------------------------------

    pub fn z_order(&self) -> i32 {
        self.0.borrow().z_order
    }

    /// Sets the z-order and moves the actor among its siblings.
    pub fn set_z_order(&self, z_order: i32) {
        {
            let mut node = self.0.borrow_mut();
            if node.z_order == z_order {
                return;
            }
            node.z_order = z_order;
        }
        self.reorder();
    }

    /// Re-inserts the actor after the last sibling whose z-order is not
    /// greater than its own (scanning from the back), or at the front.
    pub fn reorder(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        let z_order = self.z_order();

        let mut parent = parent.0.borrow_mut();
        let Some(index) = parent.children.iter().position(|c| c.ptr_eq(self)) else {
            return;
        };
        let me = parent.children.remove(index);

        let insert_at = parent
            .children
            .iter()
            .rposition(|sibling| sibling.z_order() <= z_order)
            .map_or(0, |i| i + 1);
        parent.children.insert(insert_at, me);
    }

    //=====================================================================
    // Transform
    //=====================================================================

    pub fn position(&self) -> Point {
        self.0.borrow().transform.position
    }

    pub fn set_position(&self, x: f64, y: f64) {
        self.set_position_point(Point::new(x, y));
    }

    pub fn set_position_point(&self, position: Point) {
        let mut node = self.0.borrow_mut();
        if node.transform.position != position {
            node.transform.position = position;
            node.mark_dirty();
        }
    }

    pub fn set_position_x(&self, x: f64) {
        let y = self.position().y;
        self.set_position(x, y);
    }

    pub fn set_position_y(&self, y: f64) {
        let x = self.position().x;
        self.set_position(x, y);
    }

    /// Moves the actor by `(dx, dy)`.
    pub fn move_by(&self, dx: f64, dy: f64) {
        let position = self.position();
        self.set_position(position.x + dx, position.y + dy);
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.0.borrow().transform.rotation
    }

    pub fn set_rotation(&self, degrees: f64) {
        let mut node = self.0.borrow_mut();
        if node.transform.rotation != degrees {
            node.transform.rotation = degrees;
            node.fast_transform = false;
            node.mark_dirty();
        }
    }

    pub fn scale(&self) -> Vec2 {
        self.0.borrow().transform.scale
    }

    pub fn set_scale(&self, scale_x: f64, scale_y: f64) {
        let scale = Vec2::new(scale_x, scale_y);
        let mut node = self.0.borrow_mut();
        if node.transform.scale != scale {
            node.transform.scale = scale;
            node.fast_transform = false;
            node.mark_dirty();
        }
    }

    /// Skew angles in degrees.
    pub fn skew(&self) -> Vec2 {
        self.0.borrow().transform.skew
    }

    pub fn set_skew(&self, skew_x: f64, skew_y: f64) {
        let skew = Vec2::new(skew_x, skew_y);
        let mut node = self.0.borrow_mut();
        if node.transform.skew != skew {
            node.transform.skew = skew;
            node.fast_transform = false;
            node.mark_dirty();
        }
    }

    pub fn transform(&self) -> Transform {
        self.0.borrow().transform
    }

    /// Replaces the whole transform descriptor.
    pub fn set_transform(&self, transform: Transform) {
        let mut node = self.0.borrow_mut();
        node.transform = transform;
        node.fast_transform = transform.is_translation_only();
        node.mark_dirty();
    }

    /// Normalized pivot: (0, 0) top-left, (0.5, 0.5) center.
    pub fn anchor(&self) -> Vec2 {
        self.0.borrow().anchor
    }

    pub fn set_anchor(&self, anchor_x: f64, anchor_y: f64) {
        let anchor = Vec2::new(anchor_x, anchor_y);
        let mut node = self.0.borrow_mut();
        if node.anchor != anchor {
            node.anchor = anchor;
            node.mark_dirty();
        }
    }

    pub fn size(&self) -> Size {
        self.0.borrow().size
    }

    pub fn width(&self) -> f64 {
        self.size().width
    }

    pub fn height(&self) -> f64 {
        self.size().height
    }

    pub fn set_size(&self, width: f64, height: f64) {
        let size = Size::new(width, height);
        let mut node = self.0.borrow_mut();
        if node.size != size {
            node.size = size;
            node.mark_dirty();
        }
    }

    pub fn set_width(&self, width: f64) {
        let height = self.height();
        self.set_size(width, height);
    }

    pub fn set_height(&self, height: f64) {
        let width = self.width();
        self.set_size(width, height);
    }

    //--- Matrices ---------------------------------------------------------

    /// Local-to-world matrix, recomputed if this actor or any ancestor
    /// changed since the last read.
    pub fn transform_matrix(&self) -> Affine {
        self.resolve_transform();
        self.0.borrow().matrix
    }

    /// World-to-local matrix; `None` when the transform is singular.
    pub fn inverse_matrix(&self) -> Option<Affine> {
        self.resolve_transform();
        let mut node = self.0.borrow_mut();
        if node.dirty_inverse {
            node.matrix_inverse = invert(node.matrix);
            node.dirty_inverse = false;
        }
        node.matrix_inverse
    }

    /// Converts a world point into this actor's local space.
    pub fn to_local(&self, point: Point) -> Option<Point> {
        self.inverse_matrix().map(|inverse| inverse * point)
    }

    /// Converts a local point into world space.
    pub fn to_world(&self, point: Point) -> Point {
        self.transform_matrix() * point
    }

    fn resolve_transform(&self) {
        let mut chain = vec![self.clone()];
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            chain.push(node);
        }

        for node in chain.iter().rev() {
            node.recompute_if_dirty();
        }
    }

    fn cached_matrix(&self) -> Affine {
        self.0.borrow().matrix
    }

    fn recompute_if_dirty(&self) {
        if !self.0.borrow().dirty_transform {
            return;
        }

        let parent_matrix = self.parent().map(|parent| parent.cached_matrix());

        let mut node = self.0.borrow_mut();
        node.dirty_transform = false;
        node.dirty_inverse = true;

        let local = if node.fast_transform {
            Affine::translate(node.transform.position.to_vec2())
        } else {
            node.transform.to_affine()
        };
        let anchor_offset = Affine::translate(Vec2::new(
            -node.size.width * node.anchor.x,
            -node.size.height * node.anchor.y,
        ));
        let local = local * anchor_offset;

        node.matrix = match parent_matrix {
            Some(parent) => parent * local,
            None => local,
        };

        for child in &node.children {
            child.0.borrow_mut().mark_dirty();
        }
    }

    //--- Bounds & Hit Testing ---------------------------------------------

    /// Local bounds; `(0, 0, size)` unless the visual says otherwise.
    pub fn bounds(&self) -> Rect {
        self.0.borrow().local_bounds()
    }

    /// Axis-aligned world-space box around the transformed bounds.
    pub fn bounding_box(&self) -> Rect {
        let matrix = self.transform_matrix();
        matrix.transform_rect_bbox(self.bounds())
    }

    /// Returns `true` if the world point `point` lies inside the actor.
    ///
    /// Zero-sized actors and actors with a singular transform never
    /// contain anything.
    pub fn contains_point(&self, point: Point) -> bool {
        let size = self.size();
        if size.width == 0.0 || size.height == 0.0 {
            return false;
        }

        let Some(inverse) = self.inverse_matrix() else {
            return false;
        };
        let local = inverse * point;

        let node = self.0.borrow();
        match &node.visual {
            Some(visual) => visual.contains_local_point(local, node.size),
            None => node.local_bounds().contains(local),
        }
    }

    //=====================================================================
    // Opacity
    //=====================================================================

    pub fn opacity(&self) -> f32 {
        self.0.borrow().opacity
    }

    /// Opacity actually used for drawing (after the cascade).
    pub fn displayed_opacity(&self) -> f32 {
        self.0.borrow().displayed_opacity
    }

    /// Sets the opacity (clamped to 0..=1) and refreshes the subtree.
    pub fn set_opacity(&self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        {
            let mut node = self.0.borrow_mut();
            if node.opacity == opacity {
                return;
            }
            node.opacity = opacity;
        }
        self.update_opacity();
    }

    pub fn is_cascade_opacity(&self) -> bool {
        self.0.borrow().cascade_opacity
    }

    /// When enabled, the displayed opacity is multiplied by the parent's.
    pub fn set_cascade_opacity(&self, enabled: bool) {
        {
            let mut node = self.0.borrow_mut();
            if node.cascade_opacity == enabled {
                return;
            }
            node.cascade_opacity = enabled;
        }
        self.update_opacity();
    }

    fn update_opacity(&self) {
        let parent_opacity = self.parent().map(|parent| parent.displayed_opacity());

        let children = {
            let mut node = self.0.borrow_mut();
            node.displayed_opacity = match parent_opacity {
                Some(parent) if node.cascade_opacity => node.opacity * parent,
                _ => node.opacity,
            };
            node.children.clone()
        };

        for child in children {
            child.update_opacity();
        }
    }

    //=====================================================================
    // Flags
    //=====================================================================

    pub fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }

    /// Invisible actors are neither rendered nor dispatched to (subtree
    /// included), but keep updating.
    pub fn set_visible(&self, visible: bool) {
        self.0.borrow_mut().visible = visible;
    }

    pub fn is_responsive(&self) -> bool {
        self.0.borrow().responsive
    }

    /// Responsive actors track hover/press state and synthesize
    /// `MouseHover`, `MouseOut` and `MouseClick` events.
    pub fn set_responsive(&self, responsive: bool) {
        let mut node = self.0.borrow_mut();
        node.responsive = responsive;
        if !responsive {
            node.hover = false;
            node.pressed = false;
        }
    }

    pub fn is_update_pausing(&self) -> bool {
        self.0.borrow().update_pausing
    }

    /// Skips this actor's own update work; children still update.
    pub fn set_update_pausing(&self, pausing: bool) {
        self.0.borrow_mut().update_pausing = pausing;
    }

    pub fn is_showing_border(&self) -> bool {
        self.0.borrow().show_border
    }

    pub fn set_show_border(&self, show: bool) {
        self.0.borrow_mut().show_border = show;
    }

    pub fn is_hovered(&self) -> bool {
        self.0.borrow().hover
    }

    pub fn is_pressed(&self) -> bool {
        self.0.borrow().pressed
    }

    //=====================================================================
    // Visual
    //=====================================================================

    pub fn set_visual(&self, visual: impl Visual) {
        self.0.borrow_mut().visual = Some(Box::new(visual));
    }

    pub fn take_visual(&self) -> Option<Box<dyn Visual>> {
        self.0.borrow_mut().visual.take()
    }

    pub fn has_visual(&self) -> bool {
        self.0.borrow().visual.is_some()
    }

    /// Runs `f` against the visual if it is a `V`.
    pub fn with_visual<V: Visual, R>(&self, f: impl FnOnce(&V) -> R) -> Option<R> {
        let node = self.0.borrow();
        node.visual
            .as_ref()
            .and_then(|visual| visual.as_any().downcast_ref::<V>())
            .map(f)
    }

    /// Runs `f` against the visual mutably if it is a `V`.
    pub fn with_visual_mut<V: Visual, R>(&self, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let mut node = self.0.borrow_mut();
        node.visual
            .as_mut()
            .and_then(|visual| visual.as_any_mut().downcast_mut::<V>())
            .map(f)
    }

    //=====================================================================
    // Actions
    //=====================================================================

    /// Starts running `action` on this actor.
    pub fn run_action(&self, action: Action) -> ActionRef {
        self.0.borrow_mut().actions.add_action(action)
    }

    pub fn get_action(&self, name: &str) -> Option<ActionRef> {
        self.0.borrow().actions.get_action(name)
    }

    pub fn actions(&self) -> Vec<ActionRef> {
        self.0.borrow().actions.actions().to_vec()
    }

    pub fn pause_action(&self, name: &str) {
        self.0.borrow().actions.pause_action(name);
    }

    pub fn resume_action(&self, name: &str) {
        self.0.borrow().actions.resume_action(name);
    }

    pub fn stop_action(&self, name: &str) {
        self.0.borrow().actions.stop_action(name);
    }

    pub fn pause_all_actions(&self) {
        self.0.borrow().actions.pause_all_actions();
    }

    pub fn resume_all_actions(&self) {
        self.0.borrow().actions.resume_all_actions();
    }

    pub fn stop_all_actions(&self) {
        self.0.borrow().actions.stop_all_actions();
    }

    //=====================================================================
    // Tasks
    //=====================================================================

    /// Adds and starts a task owned by this actor.
    pub fn add_task(&self, task: TaskRef) -> TaskRef {
        self.0.borrow_mut().tasks.add_task(task)
    }

    pub fn find_task(&self, name: &str) -> Option<TaskRef> {
        self.0.borrow().tasks.find(name)
    }

    pub fn tasks(&self) -> Vec<TaskRef> {
        self.0.borrow().tasks.tasks().to_vec()
    }

    pub fn start_tasks(&self, name: &str) {
        self.0.borrow().tasks.start_tasks(name);
    }

    pub fn stop_tasks(&self, name: &str) {
        self.0.borrow().tasks.stop_tasks(name);
    }

    pub fn pause_tasks(&self, name: &str) {
        self.0.borrow().tasks.pause_tasks(name);
    }

    pub fn resume_tasks(&self, name: &str) {
        self.0.borrow().tasks.resume_tasks(name);
    }

    pub fn remove_tasks(&self, name: &str) {
        self.0.borrow_mut().tasks.remove_tasks(name);
    }

    pub fn stop_all_tasks(&self) {
        self.0.borrow().tasks.stop_all_tasks();
    }

    //=====================================================================
    // Listeners
    //=====================================================================

    pub fn add_listener(&self, listener: EventListener) -> ListenerRef {
        self.0.borrow_mut().listeners.add_listener(listener)
    }

    /// Shorthand for a listener filtered on `event_type`.
    pub fn on<F>(&self, event_type: EventType, callback: F) -> ListenerRef
    where
        F: FnMut(&mut Event) + 'static,
    {
        self.add_listener(EventListener::new(event_type, callback))
    }

    pub fn start_listeners(&self, name: &str) {
        self.0.borrow().listeners.start_listeners(name);
    }

    pub fn stop_listeners(&self, name: &str) {
        self.0.borrow().listeners.stop_listeners(name);
    }

    pub fn remove_listeners(&self, name: &str) {
        self.0.borrow_mut().listeners.remove_listeners(name);
    }

    pub fn remove_all_listeners(&self) {
        self.0.borrow_mut().listeners.remove_all_listeners();
    }

    pub fn listener_count(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    //=====================================================================
    // Update
    //=====================================================================

    /// Sets the per-frame callback, run after actions and tasks.
    pub fn set_update_callback<F>(&self, callback: F)
    where
        F: FnMut(&ActorRef, f64) + 'static,
    {
        self.0.borrow_mut().on_update = Some(Box::new(callback));
    }

    pub fn clear_update_callback(&self) {
        self.0.borrow_mut().on_update = None;
    }

    /// Advances this actor and its subtree by `dt` seconds.
    ///
    /// Own work (skipped while update-pausing): actions, tasks, update
    /// callback, visual hook. Children are updated afterwards, in z-order,
    /// from a snapshot; children detached during the pass are skipped.
    pub fn update(&self, dt: f64) {
        if !self.is_update_pausing() {
            self.update_actions(dt);
            self.update_tasks(dt);
            self.run_update_callback(dt);
            self.update_visual(dt);
        }

        for child in self.children() {
            if child.is_child_of(self) {
                child.update(dt);
            }
        }
    }

    fn update_actions(&self, dt: f64) {
        if self.0.borrow().actions.is_empty() {
            return;
        }
        let actions = self.0.borrow().actions.snapshot();
        ActionManager::step_actions(&actions, self, dt);
        self.0.borrow_mut().actions.sweep();
    }

    fn update_tasks(&self, dt: f64) {
        if self.0.borrow().tasks.is_empty() {
            return;
        }
        let tasks = self.0.borrow().tasks.snapshot();
        TaskManager::update_tasks(&tasks, dt);
        self.0.borrow_mut().tasks.sweep();
    }

    fn run_update_callback(&self, dt: f64) {
        let callback = self.0.borrow_mut().on_update.take();
        if let Some(mut callback) = callback {
            callback(self, dt);
            let mut node = self.0.borrow_mut();
            if node.on_update.is_none() {
                node.on_update = Some(callback);
            }
        }
    }

    fn update_visual(&self, dt: f64) {
        let visual = self.0.borrow_mut().visual.take();
        if let Some(mut visual) = visual {
            visual.on_update(self, dt);
            let mut node = self.0.borrow_mut();
            if node.visual.is_none() {
                node.visual = Some(visual);
            }
        }
    }

    //=====================================================================
    // Render
    //=====================================================================

    /// Draws this actor and its subtree.
    ///
    /// Children with negative z-order are drawn first, then this actor's
    /// visual, then the remaining children. Invisible subtrees are
    /// skipped entirely.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        if !self.is_visible() {
            return;
        }

        let matrix = self.transform_matrix();
        let children = self.children();
        let split = children
            .iter()
            .position(|child| child.z_order() >= 0)
            .unwrap_or(children.len());

        for child in &children[..split] {
            child.render(renderer);
        }

        self.render_self(renderer, matrix);

        for child in &children[split..] {
            child.render(renderer);
        }
    }

    fn render_self(&self, renderer: &mut dyn Renderer, matrix: Affine) {
        let node = self.0.borrow();
        if let Some(visual) = &node.visual {
            renderer.set_transform(matrix);
            renderer.set_opacity(node.displayed_opacity);
            visual.on_render(renderer, node.size);
        }
    }

    /// Draws debug bounds for every actor in the subtree with
    /// show-border enabled.
    pub fn render_border(&self, renderer: &mut dyn Renderer) {
        let (show, size) = {
            let node = self.0.borrow();
            (node.show_border, node.size)
        };

        if show && size != Size::ZERO {
            let bounds = self.bounds();
            renderer.set_transform(self.transform_matrix());
            renderer.fill_rect(bounds, Color::RED.with_alpha(0.4));
            renderer.draw_rect(bounds, Color::RED.with_alpha(0.8), 2.0);
        }

        for child in self.children() {
            child.render_border(renderer);
        }
    }

    //=====================================================================
    // Dispatch
    //=====================================================================

    /// Routes `event` through this subtree.
    ///
    /// Children see the event first, front-most first. For mouse events a
    /// responsive actor under the cursor claims the event (sets itself as
    /// target) unless someone in front already did, and synthesizes
    /// `MouseHover` / `MouseOut` / `MouseClick` for its own listeners.
    /// Finally the event goes to this actor's listener chain.
    pub fn dispatch(&self, event: &mut Event) {
        if !self.is_visible() {
            return;
        }

        for child in self.children().iter().rev() {
            if child.is_child_of(self) {
                child.dispatch(event);
            }
        }

        if self.is_responsive() && event.is_mouse() {
            self.handle_mouse(event);
        }

        self.dispatch_to_listeners(event);
    }

    fn handle_mouse(&self, event: &mut Event) {
        match event.event_type() {
            EventType::MouseMove => {
                let inside = !event.has_target()
                    && event.position().map_or(false, |pos| self.contains_point(pos));

                if inside {
                    event.set_target(self);
                    let entered = {
                        let mut node = self.0.borrow_mut();
                        !std::mem::replace(&mut node.hover, true)
                    };
                    if entered {
                        if let Some(mut hover) = event.hover_for(self) {
                            self.dispatch_to_listeners(&mut hover);
                        }
                    }
                } else if self.is_hovered() {
                    {
                        let mut node = self.0.borrow_mut();
                        node.hover = false;
                        node.pressed = false;
                    }
                    if let Some(mut out) = event.out_for(self) {
                        self.dispatch_to_listeners(&mut out);
                    }
                }
            }
            EventType::MouseDown if self.is_hovered() => {
                self.0.borrow_mut().pressed = true;
                event.set_target(self);
            }
            EventType::MouseUp if self.is_pressed() => {
                self.0.borrow_mut().pressed = false;
                event.set_target(self);
                if let Some(mut click) = event.click_for(self) {
                    self.dispatch_to_listeners(&mut click);
                }
            }
            _ => {}
        }
    }

    fn dispatch_to_listeners(&self, event: &mut Event) {
        if self.0.borrow().listeners.is_empty() {
            return;
        }
        let listeners = self.0.borrow().listeners.snapshot();
        EventDispatcher::deliver(&listeners, event);
        self.0.borrow_mut().listeners.sweep();
    }

    //=====================================================================
    // Subtree Operations
    //=====================================================================

    /// Stops every action on this actor and all descendants.
    pub fn stop_all_actions_in_subtree(&self) {
        self.stop_all_actions();
        for child in self.children() {
            child.stop_all_actions_in_subtree();
        }
    }

    /// Sets update-pausing on this actor and all descendants.
    pub fn pause_updates_in_subtree(&self, pausing: bool) {
        self.set_update_pausing(pausing);
        for child in self.children() {
            child.pause_updates_in_subtree(pausing);
        }
    }

    /// Stops tasks named `name` on this actor and all descendants.
    pub fn stop_tasks_in_subtree(&self, name: &str) {
        self.stop_tasks(name);
        for child in self.children() {
            child.stop_tasks_in_subtree(name);
        }
    }

    /// Depth-first pre-order visit of the subtree (self included).
    pub fn visit(&self, f: &mut dyn FnMut(&ActorRef)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }
}

//--- Trait Implementations -----------------------------------------------

impl Default for ActorRef {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ActorRef {}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(node) => f
                .debug_struct("Actor")
                .field("name", &node.name)
                .field("z_order", &node.z_order)
                .field("position", &node.transform.position)
                .field("children", &node.children.len())
                .finish(),
            Err(_) => f.write_str("Actor(<borrowed>)"),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::MouseButton;
    use crate::core::render::recording::{DrawCall, RecordingRenderer};
    use crate::core::task::Task;
    use std::cell::Cell;

    //--- Test Helpers -----------------------------------------------------

    fn assert_point_eq(a: Point, b: Point) {
        assert!((a - b).hypot() < 1e-9, "{:?} != {:?}", a, b);
    }

    fn named(name: &str) -> ActorRef {
        let actor = ActorRef::new();
        actor.set_name(name);
        actor
    }

    fn names(actors: &[ActorRef]) -> Vec<String> {
        actors.iter().map(ActorRef::name).collect()
    }

    /// Visual that logs its name when drawn.
    struct Marker {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Visual for Marker {
        fn on_render(&self, _renderer: &mut dyn Renderer, _size: Size) {
            self.log.borrow_mut().push(self.name);
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    fn marked(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> ActorRef {
        let actor = ActorRef::from_visual(Marker {
            name,
            log: Rc::clone(log),
        });
        actor.set_name(name);
        actor
    }

    fn event_log(actor: &ActorRef) -> Rc<RefCell<Vec<EventType>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        actor.add_listener(EventListener::all(move |event| {
            sink.borrow_mut().push(event.event_type());
        }));
        log
    }

    fn square(x: f64, y: f64, side: f64) -> ActorRef {
        let actor = ActorRef::new();
        actor.set_position(x, y);
        actor.set_size(side, side);
        actor.set_responsive(true);
        actor
    }

    //=====================================================================
    // Hierarchy Tests
    //=====================================================================

    #[test]
    fn add_child_links_parent_and_stage() {
        let stage = ActorRef::new();
        stage.set_stage(Some(&stage));
        let parent = ActorRef::new();
        let child = ActorRef::new();

        parent.add_child(&child).unwrap();
        stage.add_child(&parent).unwrap();

        assert_eq!(child.parent(), Some(parent.clone()));
        assert_eq!(parent.stage(), Some(stage.clone()));
        assert_eq!(child.stage(), Some(stage.clone()), "stage propagates to the subtree");
    }

    #[test]
    fn add_child_rejects_actor_with_parent() {
        let a = ActorRef::new();
        let b = ActorRef::new();
        let child = ActorRef::new();
        a.add_child(&child).unwrap();

        assert_eq!(b.add_child(&child), Err(SceneError::AlreadyHasParent));
        assert_eq!(b.child_count(), 0);
        assert_eq!(child.parent(), Some(a));
    }

    #[test]
    fn add_child_rejects_cycles() {
        let root = ActorRef::new();
        let mid = ActorRef::new();
        let leaf = ActorRef::new();
        root.add_child(&mid).unwrap();
        mid.add_child(&leaf).unwrap();

        assert_eq!(root.add_child(&root), Err(SceneError::Cycle));
        assert_eq!(leaf.add_child(&root), Err(SceneError::Cycle));
        assert_eq!(leaf.child_count(), 0);
        assert!(root.parent().is_none());
    }

    #[test]
    fn remove_child_clears_parent_and_stage_recursively() {
        let stage = ActorRef::new();
        stage.set_stage(Some(&stage));
        let parent = ActorRef::new();
        let child = ActorRef::new();
        parent.add_child(&child).unwrap();
        stage.add_child(&parent).unwrap();

        stage.remove_child(&parent).unwrap();

        assert!(parent.parent().is_none());
        assert!(parent.stage().is_none());
        assert!(child.stage().is_none());
        assert_eq!(child.parent(), Some(parent), "inner links are kept");
    }

    #[test]
    fn remove_child_that_is_not_a_child() {
        let a = ActorRef::new();
        let stranger = ActorRef::new();
        assert_eq!(a.remove_child(&stranger), Err(SceneError::NotAChild));
    }

    #[test]
    fn find_and_remove_children_by_name() {
        let parent = ActorRef::new();
        for name in ["coin", "enemy", "coin"] {
            parent.add_child(&named(name)).unwrap();
        }

        assert_eq!(parent.get_children("coin").len(), 2);
        assert!(parent.get_child("enemy").is_some());
        assert!(parent.get_child("boss").is_none());

        assert_eq!(parent.remove_children("coin"), 2);
        assert_eq!(names(&parent.children()), vec!["enemy"]);
    }

    #[test]
    fn remove_from_parent_clears_a_stale_parent_link() {
        let parent = ActorRef::new();
        let child = ActorRef::new();
        parent.add_child(&child).unwrap();

        child.remove_from_parent();
        assert!(child.parent().is_none());
        child.remove_from_parent();

        // Parent link without a matching child entry.
        child.0.borrow_mut().parent = Some(parent.downgrade());
        child.remove_from_parent();
        assert!(child.parent().is_none());
        assert!(parent.children().is_empty());
        assert_eq!(parent.remove_children("missing"), 0);
    }

    #[test]
    fn remove_all_children_detaches_each() {
        let parent = ActorRef::new();
        let a = ActorRef::new();
        let b = ActorRef::new();
        parent.add_children(&[a.clone(), b.clone()]).unwrap();

        parent.remove_all_children();

        assert_eq!(parent.child_count(), 0);
        assert!(a.parent().is_none());
        assert!(b.parent().is_none());
    }

    //=====================================================================
    // Z-Order Tests
    //=====================================================================

    #[test]
    fn children_sorted_by_z_with_ties_in_append_order() {
        let parent = ActorRef::new();
        let specs = [("a", 2), ("b", 0), ("c", -1), ("d", 0), ("e", 2), ("f", 1)];
        for (name, z) in specs {
            let child = named(name);
            child.set_z_order(z);
            parent.add_child(&child).unwrap();
        }

        assert_eq!(names(&parent.children()), vec!["c", "b", "d", "f", "a", "e"]);
    }

    #[test]
    fn set_z_order_moves_after_last_peer() {
        let parent = ActorRef::new();
        let a = named("a");
        let b = named("b");
        let c = named("c");
        parent.add_children(&[a.clone(), b.clone(), c.clone()]).unwrap();

        a.set_z_order(1);
        assert_eq!(names(&parent.children()), vec!["b", "c", "a"]);

        c.set_z_order(1);
        assert_eq!(names(&parent.children()), vec!["b", "a", "c"]);

        c.set_z_order(-5);
        assert_eq!(names(&parent.children()), vec!["c", "b", "a"]);

        let zs: Vec<i32> = parent.children().iter().map(ActorRef::z_order).collect();
        assert!(zs.windows(2).all(|w| w[0] <= w[1]));
    }

    //=====================================================================
    // Transform Tests
    //=====================================================================

    #[test]
    fn world_matrix_composes_parent_and_anchor() {
        let parent = ActorRef::new();
        parent.set_position(100.0, 100.0);
        let child = ActorRef::with_anchor(0.5, 0.5);
        child.set_size(20.0, 10.0);
        child.set_position(10.0, 0.0);
        parent.add_child(&child).unwrap();

        // Local origin sits at position - size * anchor.
        assert_point_eq(child.to_world(Point::ZERO), Point::new(100.0, 95.0));
    }

    #[test]
    fn ancestor_change_is_observed_by_descendants() {
        let root = ActorRef::new();
        let mid = ActorRef::new();
        let leaf = ActorRef::new();
        root.add_child(&mid).unwrap();
        mid.add_child(&leaf).unwrap();
        leaf.set_position(1.0, 1.0);

        assert_point_eq(leaf.to_world(Point::ZERO), Point::new(1.0, 1.0));

        root.set_position(50.0, 0.0);
        assert_point_eq(leaf.to_world(Point::ZERO), Point::new(51.0, 1.0));

        mid.set_rotation(90.0);
        // (1, 1) rotated 90° → (-1, 1), then + (50, 0)
        assert_point_eq(leaf.to_world(Point::ZERO), Point::new(49.0, 1.0));

        root.set_scale(2.0, 2.0);
        assert_point_eq(leaf.to_world(Point::ZERO), Point::new(48.0, 2.0));
    }

    #[test]
    fn reading_sibling_then_ancestor_change_stays_consistent() {
        let root = ActorRef::new();
        let a = ActorRef::new();
        let b = ActorRef::new();
        root.add_children(&[a.clone(), b.clone()]).unwrap();

        let _ = a.transform_matrix();
        root.set_position(5.0, 5.0);
        let _ = a.transform_matrix();

        assert_point_eq(b.to_world(Point::ZERO), Point::new(5.0, 5.0));
    }

    #[test]
    fn removal_restores_local_space() {
        let parent = ActorRef::new();
        parent.set_position(30.0, 0.0);
        let child = ActorRef::new();
        parent.add_child(&child).unwrap();
        assert_point_eq(child.to_world(Point::ZERO), Point::new(30.0, 0.0));

        child.remove_from_parent();
        assert_point_eq(child.to_world(Point::ZERO), Point::ZERO);
    }

    #[test]
    fn bounding_box_is_world_space() {
        let actor = ActorRef::new();
        actor.set_size(10.0, 20.0);
        actor.set_position(5.0, 5.0);
        actor.set_scale(2.0, 1.0);
        assert_eq!(actor.bounding_box(), Rect::new(5.0, 5.0, 25.0, 25.0));
    }

    //=====================================================================
    // Hit Testing Tests
    //=====================================================================

    #[test]
    fn contains_point_uses_inverse_transform() {
        let actor = ActorRef::new();
        actor.set_size(10.0, 10.0);
        actor.set_position(100.0, 100.0);
        actor.set_rotation(45.0);

        assert!(actor.contains_point(Point::new(100.0, 105.0)));
        assert!(!actor.contains_point(Point::new(105.0, 100.0)));
    }

    #[test]
    fn zero_size_or_singular_never_contains() {
        let actor = ActorRef::new();
        assert!(!actor.contains_point(Point::ZERO));

        actor.set_size(10.0, 10.0);
        assert!(actor.contains_point(Point::new(1.0, 1.0)));

        actor.set_scale(0.0, 1.0);
        assert!(actor.inverse_matrix().is_none());
        assert!(!actor.contains_point(Point::new(0.0, 1.0)));
    }

    //=====================================================================
    // Opacity Tests
    //=====================================================================

    #[test]
    fn opacity_cascades_only_when_enabled() {
        let parent = ActorRef::new();
        let child = ActorRef::new();
        parent.add_child(&child).unwrap();
        parent.set_opacity(0.5);
        child.set_opacity(0.5);

        assert_eq!(child.displayed_opacity(), 0.5);

        child.set_cascade_opacity(true);
        assert_eq!(child.displayed_opacity(), 0.25);

        parent.set_opacity(1.0);
        assert_eq!(child.displayed_opacity(), 0.5, "recomputed eagerly");
    }

    #[test]
    fn opacity_is_clamped() {
        let actor = ActorRef::new();
        actor.set_opacity(1.7);
        assert_eq!(actor.opacity(), 1.0);
        actor.set_opacity(-3.0);
        assert_eq!(actor.displayed_opacity(), 0.0);
    }

    #[test]
    fn cascading_child_follows_new_parent() {
        let a = ActorRef::new();
        a.set_opacity(0.2);
        let child = ActorRef::new();
        child.set_cascade_opacity(true);

        a.add_child(&child).unwrap();
        assert!((child.displayed_opacity() - 0.2).abs() < 1e-6);

        child.remove_from_parent();
        assert_eq!(child.displayed_opacity(), 1.0);
    }

    //=====================================================================
    // Update Tests
    //=====================================================================

    #[test]
    fn update_runs_own_work_then_children() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let parent = named("parent");
        let child = named("child");
        parent.add_child(&child).unwrap();

        for actor in [&parent, &child] {
            let order = Rc::clone(&order);
            actor.set_update_callback(move |me, _| order.borrow_mut().push(me.name()));
        }
        {
            let order = Rc::clone(&order);
            parent.add_task(Task::every_frame("t", move |_| order.borrow_mut().push("task".into())));
        }

        parent.update(0.016);
        assert_eq!(*order.borrow(), vec!["task", "parent", "child"]);
    }

    #[test]
    fn update_pausing_skips_only_own_work() {
        let hits = Rc::new(Cell::new(0));
        let parent = ActorRef::new();
        let child = ActorRef::new();
        parent.add_child(&child).unwrap();
        for actor in [&parent, &child] {
            let hits = Rc::clone(&hits);
            actor.set_update_callback(move |_, _| hits.set(hits.get() + 1));
        }

        parent.set_update_pausing(true);
        parent.update(0.1);
        assert_eq!(hits.get(), 1);

        parent.pause_updates_in_subtree(true);
        parent.update(0.1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn child_may_remove_itself_during_update() {
        let parent = ActorRef::new();
        let quitter = named("quitter");
        let stayer = named("stayer");
        parent.add_children(&[quitter.clone(), stayer.clone()]).unwrap();

        quitter.set_update_callback(|me, _| me.remove_from_parent());
        let stayer_ran = Rc::new(Cell::new(false));
        {
            let flag = Rc::clone(&stayer_ran);
            stayer.set_update_callback(move |_, _| flag.set(true));
        }

        drop(quitter);
        parent.update(0.016);

        assert!(stayer_ran.get());
        assert_eq!(names(&parent.children()), vec!["stayer"]);
    }

    #[test]
    fn sibling_removed_during_update_is_skipped() {
        let parent = ActorRef::new();
        let first = ActorRef::new();
        let second = ActorRef::new();
        parent.add_children(&[first.clone(), second.clone()]).unwrap();

        let victim = second.clone();
        first.set_update_callback(move |_, _| victim.remove_from_parent());
        let ran = Rc::new(Cell::new(false));
        {
            let ran = Rc::clone(&ran);
            second.set_update_callback(move |_, _| ran.set(true));
        }

        parent.update(0.016);
        assert!(!ran.get());
    }

    #[test]
    fn update_callback_can_add_children() {
        let parent = ActorRef::new();
        parent.set_update_callback(|me, _| {
            if me.child_count() < 3 {
                me.add_child(&ActorRef::new()).unwrap();
            }
        });

        parent.update(0.016);
        parent.update(0.016);
        assert_eq!(parent.child_count(), 2);
    }

    #[test]
    fn stop_tasks_in_subtree_by_name() {
        let parent = ActorRef::new();
        let child = ActorRef::new();
        parent.add_child(&child).unwrap();
        parent.add_task(Task::every_frame("blink", |_| {}));
        child.add_task(Task::every_frame("blink", |_| {}));
        child.add_task(Task::every_frame("spin", |_| {}));

        parent.stop_tasks_in_subtree("blink");
        parent.update(0.016);

        assert!(parent.tasks().is_empty());
        assert_eq!(child.tasks().len(), 1);
        assert!(child.find_task("spin").is_some());
    }

    //=====================================================================
    // Render Tests
    //=====================================================================

    #[test]
    fn render_order_negative_children_self_then_rest() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let parent = marked("P", &log);
        for (name, z) in [("2", 2), ("-1", -1), ("0", 0)] {
            let child = marked(name, &log);
            child.set_z_order(z);
            parent.add_child(&child).unwrap();
        }

        let mut renderer = RecordingRenderer::default();
        parent.render(&mut renderer);

        assert_eq!(*log.borrow(), vec!["-1", "P", "0", "2"]);
    }

    #[test]
    fn invisible_subtree_is_not_rendered() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let parent = marked("P", &log);
        parent.add_child(&marked("C", &log)).unwrap();
        parent.set_visible(false);

        parent.render(&mut RecordingRenderer::default());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn render_pushes_transform_and_displayed_opacity() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let parent = ActorRef::new();
        parent.set_opacity(0.5);
        parent.set_position(3.0, 4.0);
        let child = marked("C", &log);
        child.set_cascade_opacity(true);
        parent.add_child(&child).unwrap();

        let mut renderer = RecordingRenderer::default();
        parent.render(&mut renderer);

        assert_eq!(
            renderer.calls,
            vec![
                DrawCall::Transform(Affine::translate((3.0, 4.0))),
                DrawCall::Opacity(0.5),
            ]
        );
    }

    #[test]
    fn render_border_only_for_flagged_actors() {
        let parent = ActorRef::new();
        parent.set_size(10.0, 10.0);
        let child = ActorRef::new();
        child.set_size(5.0, 5.0);
        child.set_show_border(true);
        parent.add_child(&child).unwrap();

        let mut renderer = RecordingRenderer::default();
        parent.render_border(&mut renderer);

        assert_eq!(renderer.calls.len(), 3);
        assert!(matches!(renderer.calls[1], DrawCall::FillShape { .. }));
    }

    //=====================================================================
    // Dispatch Tests
    //=====================================================================

    #[test]
    fn front_most_responsive_actor_claims_hover() {
        let root = ActorRef::new();
        let back = square(0.0, 0.0, 100.0);
        let middle = square(0.0, 0.0, 100.0);
        let front = square(0.0, 0.0, 100.0);
        back.set_z_order(0);
        middle.set_z_order(1);
        front.set_z_order(2);
        root.add_children(&[back.clone(), middle.clone(), front.clone()]).unwrap();

        let back_log = event_log(&back);
        let front_log = event_log(&front);

        let mut event = Event::mouse_move(50.0, 50.0);
        root.dispatch(&mut event);

        assert!(event.is_target(&front));
        assert!(front.is_hovered());
        assert!(!middle.is_hovered());
        assert!(!back.is_hovered());
        assert_eq!(*front_log.borrow(), vec![EventType::MouseHover, EventType::MouseMove]);
        assert_eq!(*back_log.borrow(), vec![EventType::MouseMove]);
    }

    #[test]
    fn hover_moves_to_next_actor_when_front_hides() {
        let root = ActorRef::new();
        let back = square(0.0, 0.0, 100.0);
        let front = square(0.0, 0.0, 100.0);
        front.set_z_order(1);
        root.add_children(&[back.clone(), front.clone()]).unwrap();
        let front_log = event_log(&front);

        root.dispatch(&mut Event::mouse_move(10.0, 10.0));
        assert!(front.is_hovered());

        front.set_position(500.0, 500.0);
        root.dispatch(&mut Event::mouse_move(10.0, 10.0));

        assert!(!front.is_hovered());
        assert!(back.is_hovered());
        assert!(front_log.borrow().contains(&EventType::MouseOut));
    }

    #[test]
    fn press_and_release_synthesize_click() {
        let root = ActorRef::new();
        let button = square(10.0, 10.0, 20.0);
        root.add_child(&button).unwrap();
        let log = event_log(&button);

        root.dispatch(&mut Event::mouse_move(15.0, 15.0));
        let mut down = Event::mouse_down(15.0, 15.0, MouseButton::Left);
        root.dispatch(&mut down);
        assert!(button.is_pressed());
        assert!(down.is_target(&button));

        root.dispatch(&mut Event::mouse_up(15.0, 15.0, MouseButton::Left));
        assert!(!button.is_pressed());

        assert_eq!(
            *log.borrow(),
            vec![
                EventType::MouseHover,
                EventType::MouseMove,
                EventType::MouseDown,
                EventType::MouseClick,
                EventType::MouseUp,
            ]
        );
    }

    #[test]
    fn leaving_clears_pressed_without_click() {
        let root = ActorRef::new();
        let button = square(0.0, 0.0, 10.0);
        root.add_child(&button).unwrap();
        let log = event_log(&button);

        root.dispatch(&mut Event::mouse_move(5.0, 5.0));
        root.dispatch(&mut Event::mouse_down(5.0, 5.0, MouseButton::Left));
        root.dispatch(&mut Event::mouse_move(50.0, 50.0));
        root.dispatch(&mut Event::mouse_up(50.0, 50.0, MouseButton::Left));

        assert!(!log.borrow().contains(&EventType::MouseClick));
        assert!(!button.is_pressed());
    }

    #[test]
    fn invisible_actors_receive_nothing() {
        let root = ActorRef::new();
        let child = square(0.0, 0.0, 10.0);
        root.add_child(&child).unwrap();
        let log = event_log(&child);
        child.set_visible(false);

        root.dispatch(&mut Event::mouse_move(5.0, 5.0));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn listener_may_mutate_tree_during_dispatch() {
        let root = ActorRef::new();
        let child = ActorRef::new();
        root.add_child(&child).unwrap();

        let weak_root = root.downgrade();
        child.on(EventType::KeyDown, move |_| {
            if let Some(root) = weak_root.upgrade() {
                root.remove_all_children();
                root.add_child(&ActorRef::new()).unwrap();
            }
        });

        root.dispatch(&mut Event::key_down(crate::core::event::KeyCode::Enter));
        assert_eq!(root.child_count(), 1);
        assert!(child.parent().is_none());
    }
}
