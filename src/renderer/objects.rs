//! Object groups and groups

use tiny_skia::Transform;

use super::{lookup, Renderer};
use crate::error::{IndexKind, Result};
use crate::models::{Group, Object, ObjectGroup};

impl<'m> Renderer<'m> {
    /// Draw the top-level object group at `index`, whether visible or not.
    pub fn render_object_group(&mut self, index: usize) -> Result<()> {
        let map = self.map;
        let group = lookup(&map.object_groups, IndexKind::ObjectGroup, index)?;
        self.draw_object_group(group)
    }

    /// Draw every visible top-level object group in order.
    pub fn render_visible_object_groups(&mut self) -> Result<()> {
        let map = self.map;
        for group in map.object_groups.iter().filter(|g| g.visible) {
            self.draw_object_group(group)?;
        }
        Ok(())
    }

    /// Draw object group `object_group` of group `group`.
    pub fn render_group_object_group(&mut self, group: usize, object_group: usize) -> Result<()> {
        let map = self.map;
        let group = lookup(&map.groups, IndexKind::Group, group)?;
        let object_group = lookup(&group.object_groups, IndexKind::GroupObjectGroup, object_group)?;
        self.draw_object_group(object_group)
    }

    /// Draw the group at `index`: its visible layers, then its visible
    /// object groups.
    ///
    /// The group's own opacity is not applied to its children.
    pub fn render_group(&mut self, index: usize) -> Result<()> {
        let map = self.map;
        let group = lookup(&map.groups, IndexKind::Group, index)?;
        self.draw_group(group)
    }

    /// Draw every visible group in order.
    pub fn render_visible_groups(&mut self) -> Result<()> {
        let map = self.map;
        for group in map.groups.iter().filter(|g| g.visible) {
            self.draw_group(group)?;
        }
        Ok(())
    }

    fn draw_group(&mut self, group: &'m Group) -> Result<()> {
        for layer in group.layers.iter().filter(|l| l.visible) {
            self.draw_layer(layer)?;
        }
        for object_group in group.object_groups.iter().filter(|g| g.visible) {
            self.draw_object_group(object_group)?;
        }
        Ok(())
    }

    fn draw_object_group(&mut self, group: &'m ObjectGroup) -> Result<()> {
        for object in sorted_objects(group) {
            self.draw_object(object, group.opacity)?;
        }
        log::debug!("rendered object group '{}'", group.name);
        Ok(())
    }

    fn draw_object(&mut self, object: &Object, opacity: f32) -> Result<()> {
        if !object.visible {
            log::debug!("skipping hidden object {} '{}'", object.id, object.name);
            return Ok(());
        }
        let map = self.map;
        let Some(tile) = map.tile_gid_to_tile(object.gid)? else {
            log::debug!("skipping object {} '{}' without a tile", object.id, object.name);
            return Ok(());
        };

        let image = self.get_tile_image(&tile)?;
        let transform = self.object_transform(object, image.dimensions());
        self.draw(&image, transform, opacity);
        Ok(())
    }

    /// Transform taking a tile image to where `object` shows it.
    fn object_transform(&self, object: &Object, (src_w, src_h): (u32, u32)) -> Transform {
        let (src_w, src_h) = (src_w as f32, src_h as f32);
        let rotation = object.rotation as f32;

        if self.options.legacy_geometry {
            let (dst_w, dst_h) = (object.width.trunc() as f32, object.height.trunc() as f32);
            let mut transform = Transform::identity();
            if (dst_w, dst_h) != (src_w, src_h) {
                transform = transform.post_scale(dst_w / src_w, dst_h / src_h);
            }
            if rotation != 0.0 {
                transform = transform.post_rotate(rotation);
            }
            return transform;
        }

        // Zero size means "as big as the tile"
        let (dst_w, dst_h) = if object.width > 0.0 && object.height > 0.0 {
            (object.width as f32, object.height as f32)
        } else {
            (src_w, src_h)
        };
        let mut transform = Transform::identity();
        if (dst_w, dst_h) != (src_w, src_h) {
            transform = transform.post_scale(dst_w / src_w, dst_h / src_h);
        }
        // Bottom-left anchor, rotation about it
        transform = transform.post_translate(0.0, -dst_h);
        if rotation != 0.0 {
            transform = transform.post_rotate(rotation);
        }
        transform.post_translate(object.x as f32, object.y as f32)
    }
}

/// Objects in draw order: ascending y, then ascending x. Ties keep their
/// original order.
fn sorted_objects(group: &ObjectGroup) -> Vec<&Object> {
    let mut objects: Vec<&Object> = group.objects.iter().collect();
    objects.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    objects
}
