use crate::{
    area::model::{Area, AreaKind},
    area::region::RegionBody,
    content::def::{PageGeometry, RegionName},
    foundation::core::Vec2,
    layout::status::Status,
    marker::registry::MarkerRegistry,
};

/// A page under construction.
///
/// Owns its body region, static regions and ordered marker list; all three are passed down
/// explicitly through layout calls.
#[derive(Debug)]
pub struct Page {
    pub number: u32,
    pub sequence: usize,
    pub geometry: PageGeometry,
    pub body: RegionBody,
    pub before: Area,
    pub after: Area,
    pub markers: MarkerRegistry,
    blank: bool,
}

impl Page {
    pub fn new(number: u32, sequence: usize, geometry: PageGeometry) -> Self {
        let width = geometry.content_width();
        Self {
            number,
            sequence,
            body: RegionBody::from_geometry(&geometry),
            before: Area::new(AreaKind::RegionBefore, width, geometry.before_extent),
            after: Area::new(AreaKind::RegionAfter, width, geometry.after_extent),
            markers: MarkerRegistry::new(),
            geometry,
            blank: false,
        }
    }

    /// A page inserted only to satisfy an odd/even page break.
    pub fn blank(number: u32, sequence: usize, geometry: PageGeometry) -> Self {
        let mut p = Self::new(number, sequence, geometry);
        p.blank = true;
        p
    }

    pub fn is_blank(&self) -> bool {
        self.blank
    }

    pub fn region_mut(&mut self, region: RegionName) -> &mut Area {
        match region {
            RegionName::RegionBefore => &mut self.before,
            RegionName::RegionAfter => &mut self.after,
        }
    }

    /// Assemble the page area tree.
    pub fn finish(self, flow_status: Status) -> (FinishedPage, MarkerRegistry) {
        let g = self.geometry;
        let mut page = Area::new(AreaKind::Page, g.width, g.height);
        page.height = g.height;

        let mut before = self.before;
        before.offset = Vec2::new(g.margin_left, g.margin_top);
        before.height = g.before_extent;
        let mut body = self.body.into_area();
        body.offset = Vec2::new(g.margin_left, g.margin_top + g.before_extent);
        let mut after = self.after;
        after.offset = Vec2::new(
            g.margin_left,
            g.height - g.margin_bottom - g.after_extent,
        );
        after.height = g.after_extent;

        if g.before_extent > 0.0 {
            page.children.push(before);
        }
        page.children.push(body);
        if g.after_extent > 0.0 {
            page.children.push(after);
        }

        (
            FinishedPage {
                number: self.number,
                sequence: self.sequence,
                blank: self.blank,
                flow_status,
                area: page,
            },
            self.markers,
        )
    }
}

/// A completed page handed to a [`crate::PageSink`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FinishedPage {
    /// Folio number.
    pub number: u32,
    /// Index of the page sequence the page belongs to.
    pub sequence: usize,
    /// Inserted to satisfy an odd/even page break.
    pub blank: bool,
    /// Status the root flow reported when the page was closed.
    pub flow_status: Status,
    /// Page area tree.
    pub area: Area,
}

impl FinishedPage {
    /// Main reference area of the body region.
    pub fn body(&self) -> Option<&Area> {
        self.area
            .children
            .iter()
            .find(|a| a.kind == AreaKind::MainReference)
    }

    /// Area of a static region, when the page has one.
    pub fn region(&self, region: RegionName) -> Option<&Area> {
        let kind = match region {
            RegionName::RegionBefore => AreaKind::RegionBefore,
            RegionName::RegionAfter => AreaKind::RegionAfter,
        };
        self.area.children.iter().find(|a| a.kind == kind)
    }

    /// Line texts of the body region, in reading order.
    pub fn body_texts(&self) -> Vec<String> {
        self.body().map(Area::texts).unwrap_or_default()
    }

    /// Height used in the body region.
    pub fn body_height(&self) -> f64 {
        self.body().map_or(0.0, |b| b.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/area/page.rs"]
mod tests;
