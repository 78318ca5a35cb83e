use super::geometry::{self, FIRST_GROUP_ROW, TITLE_ROW};
use super::{CellStyle, DrawCommand, SheetSurface};
use crate::catalog::RoomGroup;
use crate::error::Result;
use crate::types::{CellEdit, CellRange, Coloring, RenderOptions, Room, FREE_LABEL, TAKEN_LABEL};

const ROOM_ID_HEADING: &str = "Room ID";
const NAMES_HEADING: &str = "Name Surname";

/// Output of one render pass: draw commands plus the bed-row edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPass {
    pub commands: Vec<DrawCommand>,
    pub edits: Vec<CellEdit>,
    /// Sheet width in columns
    pub width: u32,
    /// First row after the last group
    pub end_row: u32,
}

impl RenderPass {
    /// Replay every draw command onto `surface`, in order.
    ///
    /// # Errors
    /// Propagates the first surface error.
    pub fn draw<S: SheetSurface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        for command in &self.commands {
            surface.apply(command)?;
        }
        Ok(())
    }
}

/// Lays room groups out on the grid.
pub struct Renderer<'a> {
    options: &'a RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self { options }
    }

    /// Render `groups` (already sorted and grouped) into a fresh pass.
    pub fn render(&self, groups: &[RoomGroup]) -> RenderPass {
        let mode = self.options.layout;
        let mut pass = RenderPass {
            width: geometry::sheet_width(mode),
            ..RenderPass::default()
        };

        pass.commands.push(DrawCommand::Merge {
            range: geometry::full_row(TITLE_ROW, mode),
            text: self.options.title.clone(),
            style: CellStyle::Title,
        });

        let mut cursor = FIRST_GROUP_ROW;
        for group in groups {
            cursor = self.render_group(group, cursor, &mut pass);
        }
        pass.end_row = cursor;

        log::debug!(
            "Rendered {} groups: {} commands, {} edits",
            groups.len(),
            pass.commands.len(),
            pass.edits.len()
        );
        pass
    }

    /// Render one group starting at `cursor`; returns the next group's title row.
    fn render_group(&self, group: &RoomGroup, cursor: u32, pass: &mut RenderPass) -> u32 {
        let mode = self.options.layout;

        pass.commands.push(DrawCommand::Merge {
            range: geometry::full_row(cursor, mode),
            text: group.room_type.label().to_string(),
            style: CellStyle::RoomType,
        });

        let header_row = cursor + 1;
        for block in 0..geometry::blocks_per_row(mode) {
            let col = geometry::block_col(block);
            pass.commands.push(DrawCommand::Write {
                row: header_row,
                col,
                text: ROOM_ID_HEADING.to_string(),
                style: CellStyle::Plain,
            });
            pass.commands.push(DrawCommand::Merge {
                range: geometry::name_cells(header_row, col),
                text: NAMES_HEADING.to_string(),
                style: CellStyle::Names,
            });
        }

        let base = header_row + 1;
        // Every block reserves room for the group's largest room plus a spacer row.
        let stride = group.room_size() + 1;
        let mut placed = 0u32;
        for (index, room) in (0u32..).zip(group.rooms.iter()) {
            let slot = geometry::slot(index, mode);
            let top = base + slot.row_block * stride;
            self.render_room(room, index, top, geometry::block_col(slot.block), pass);
            placed += 1;
        }

        base + geometry::row_blocks(placed, mode) * stride
    }

    fn render_room(&self, room: &Room, index: u32, top: u32, col: u32, pass: &mut RenderPass) {
        if room.beds == 0 {
            return;
        }

        let id_text = room.id.to_string();
        if room.beds == 1 {
            pass.commands.push(DrawCommand::Write {
                row: top,
                col,
                text: id_text,
                style: CellStyle::RoomId,
            });
        } else {
            pass.commands.push(DrawCommand::Merge {
                range: CellRange {
                    first_row: top,
                    first_col: col,
                    last_row: top + room.beds - 1,
                    last_col: col,
                },
                text: id_text,
                style: CellStyle::RoomId,
            });
        }

        let occupied = u32::try_from(room.occupied_count()).unwrap_or(room.beds);
        let conditional = self.options.coloring == Coloring::Conditional;

        for bed in 0..room.beds {
            let taken = bed < occupied;
            let person = if taken {
                room.people.get(bed as usize).cloned().flatten()
            } else {
                None
            };
            let content = match (taken, self.options.show_names, person.as_deref()) {
                (false, _, _) => FREE_LABEL,
                (true, true, Some(name)) => name,
                (true, _, _) => TAKEN_LABEL,
            };
            let text = format!("{}. {}", bed + 1, content);
            let style = match (conditional, taken) {
                (true, _) => CellStyle::Names,
                (false, true) => CellStyle::Taken,
                (false, false) => CellStyle::Free,
            };

            let cells = geometry::name_cells(top + bed, col);
            pass.commands.push(DrawCommand::Merge {
                range: cells,
                text: text.clone(),
                style,
            });
            pass.edits.push(CellEdit {
                row: cells.first_row,
                col: cells.first_col,
                last_col: cells.last_col,
                text,
                taken,
                bed_index: bed,
                occupant_count: occupied,
                person,
                room_index_in_group: index,
                room_type: room.room_type,
                room_id: room.id,
            });
        }

        if conditional {
            pass.commands.push(DrawCommand::ConditionalFill {
                range: CellRange {
                    first_row: top,
                    first_col: col + 1,
                    last_row: top + room.beds - 1,
                    last_col: col + geometry::BLOCK_WIDTH - 1,
                },
                needle: FREE_LABEL.to_string(),
            });
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::{LayoutMode, RoomType};

    fn room(id: u32, beds: u32, people: &[&str]) -> Room {
        Room {
            id,
            room_type: RoomType::FourBed,
            beds,
            people: people.iter().map(|p| Some((*p).to_string())).collect(),
        }
    }

    fn group(rooms: Vec<Room>) -> RoomGroup {
        RoomGroup {
            room_type: RoomType::FourBed,
            rooms,
        }
    }

    #[test]
    fn test_title_spans_full_width() {
        let pass = Renderer::new(&RenderOptions::default()).render(&[]);
        match &pass.commands[0] {
            DrawCommand::Merge { range, text, style } => {
                assert_eq!((range.first_col, range.last_col), (0, 8));
                assert_eq!(text, "CECC 2019 Bookings");
                assert_eq!(*style, CellStyle::Title);
            }
            other => panic!("unexpected first command {other:?}"),
        }
        assert!(pass.edits.is_empty());
        assert_eq!(pass.end_row, FIRST_GROUP_ROW);
    }

    #[test]
    fn test_bed_text_hides_names_by_default() {
        let pass =
            Renderer::new(&RenderOptions::default()).render(&[group(vec![room(5, 3, &["Ann"])])]);
        let texts: Vec<&str> = pass.edits.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["1. Taken", "2. Free", "3. Free"]);
        assert_eq!(pass.edits[0].person.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_bed_text_shows_names() {
        let options = RenderOptions::default().with_names();
        let pass = Renderer::new(&options).render(&[group(vec![room(5, 2, &["Ann", "Bob"])])]);
        let texts: Vec<&str> = pass.edits.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["1. Ann", "2. Bob"]);
    }

    #[test]
    fn test_rooms_alternate_between_blocks() {
        let rooms = vec![room(1, 2, &[]), room(2, 2, &[]), room(3, 2, &[])];
        let pass = Renderer::new(&RenderOptions::default()).render(&[group(rooms)]);
        // group title at 2, header at 3, first row-block at 4, stride 3
        let firsts: Vec<(u32, u32)> = pass
            .edits
            .iter()
            .filter(|e| e.bed_index == 0)
            .map(|e| (e.row, e.col))
            .collect();
        assert_eq!(firsts, vec![(4, 1), (4, 6), (7, 1)]);
        assert_eq!(pass.end_row, 10);
    }

    #[test]
    fn test_single_column_layout() {
        let options = RenderOptions {
            layout: LayoutMode::SingleColumn,
            ..RenderOptions::default()
        };
        let rooms = vec![room(1, 2, &[]), room(2, 1, &[])];
        let pass = Renderer::new(&options).render(&[group(rooms)]);
        let rows: Vec<u32> = pass.edits.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![4, 5, 7]);
        assert!(pass.edits.iter().all(|e| e.col == 1 && e.last_col == 3));
        assert_eq!(pass.width, 4);
    }

    #[test]
    fn test_single_bed_room_id_is_written_not_merged() {
        let pass = Renderer::new(&RenderOptions::default()).render(&[group(vec![room(9, 1, &[])])]);
        assert!(pass.commands.iter().any(|c| matches!(
            c,
            DrawCommand::Write { row: 4, col: 0, text, style: CellStyle::RoomId } if text == "9"
        )));
    }

    #[test]
    fn test_conditional_coloring_emits_rule_per_room() {
        let options = RenderOptions {
            coloring: Coloring::Conditional,
            ..RenderOptions::default()
        };
        let pass = Renderer::new(&options).render(&[group(vec![room(1, 3, &["A"]), room(2, 2, &[])])]);
        let rules: Vec<&CellRange> = pass
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::ConditionalFill { range, .. } => Some(range),
                _ => None,
            })
            .collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].height(), 3);
        assert_eq!((rules[1].first_col, rules[1].last_col), (6, 8));
        // Taken state is still tracked on every edit
        assert!(pass.edits[0].taken);
        assert!(!pass.edits[1].taken);
    }

    #[test]
    fn test_placeholder_inside_occupied_prefix_renders_taken() {
        let options = RenderOptions::default().with_names();
        let r = Room {
            id: 1,
            room_type: RoomType::FourBed,
            beds: 3,
            people: vec![None, Some("Bob".into())],
        };
        let pass = Renderer::new(&options).render(&[group(vec![r])]);
        let texts: Vec<&str> = pass.edits.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["1. Taken", "2. Free", "3. Free"]);
    }
}
