/// Outcome of one layout call: how much of a node's subtree was consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The node completed.
    Ok,
    /// The area filled up before anything of the node was placed in this call.
    AreaFullNone,
    /// The area filled up after part of the node was placed.
    AreaFullSome,
    /// The node completed and must stay in the same column as its next sibling.
    KeepWithNext,
    /// Continue in the next column.
    ForceColumnBreak,
    /// Continue on the next page.
    ForcePageBreak,
    /// Continue on the next odd-numbered page.
    ForcePageBreakOdd,
    /// Continue on the next even-numbered page.
    ForcePageBreakEven,
}

/// Page-number parity requested by a forced page break.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageParity {
    /// Odd page numbers.
    Odd,
    /// Even page numbers.
    Even,
}

impl PageParity {
    /// Whether `page_number` has this parity.
    pub fn matches(self, page_number: u32) -> bool {
        match self {
            Self::Odd => page_number % 2 == 1,
            Self::Even => page_number % 2 == 0,
        }
    }
}

impl Status {
    /// Anything but a completed node.
    pub fn is_incomplete(self) -> bool {
        !matches!(self, Self::Ok | Self::KeepWithNext)
    }

    /// Nothing at all was laid out.
    pub fn laid_out_none(self) -> bool {
        self == Self::AreaFullNone
    }

    /// The target area ran out of room.
    pub fn is_area_full(self) -> bool {
        matches!(self, Self::AreaFullNone | Self::AreaFullSome)
    }

    /// Any of the forced page breaks.
    pub fn is_page_break(self) -> bool {
        matches!(
            self,
            Self::ForcePageBreak | Self::ForcePageBreakOdd | Self::ForcePageBreakEven
        )
    }

    /// Parity the next page must have, for parity-constrained page breaks.
    pub fn page_parity(self) -> Option<PageParity> {
        match self {
            Self::ForcePageBreakOdd => Some(PageParity::Odd),
            Self::ForcePageBreakEven => Some(PageParity::Even),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::AreaFullNone => "area-full-none",
            Self::AreaFullSome => "area-full-some",
            Self::KeepWithNext => "keep-with-next",
            Self::ForceColumnBreak => "force-column-break",
            Self::ForcePageBreak => "force-page-break",
            Self::ForcePageBreakOdd => "force-page-break-odd",
            Self::ForcePageBreakEven => "force-page-break-even",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/status.rs"]
mod tests;
