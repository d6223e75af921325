//! Card documents
//!
//! Each card is rendered as its own HTML document, loaded into a
//! [`DomService`] and highlighted there, so the cell count the highlighter
//! sees is exactly the grid's `size²`. The highlighted card containers are
//! then gathered into one printable page.

use crate::error::{CardError, Result};
use crate::grid::{self, Grid, GridSize};
use dom::utils::escape_text;
use dom::{DomSerializer, DomService, HighlightPolicy};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DEFAULT_TITLE: &str = "Byngo Card";

const PAGE_STYLE: &str = "\
body { font-family: sans-serif; }
.byngo-card { page-break-after: always; text-align: center; }
.byngo-card:last-child { page-break-after: auto; }
table.mystyle { margin: 0 auto; border-collapse: collapse; }
table.mystyle th, table.mystyle td { border: 1px solid #000; width: 3em; height: 3em; text-align: center; }
";

/// Everything needed to produce a deck
#[derive(Debug, Clone)]
pub struct CardOptions {
    pub title: String,
    pub grid_size: GridSize,
    pub min: i32,
    pub max: i32,
    pub free_space: bool,
    pub players: usize,
    pub policy: HighlightPolicy,
    /// Fixed seed for reproducible decks
    pub seed: Option<u64>,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            grid_size: GridSize::default(),
            min: 1,
            max: 50,
            free_space: true,
            players: 1,
            policy: HighlightPolicy::ByCount,
            seed: None,
        }
    }
}

fn container_id(index: usize) -> String {
    format!("byngo-card-{}", index + 1)
}

/// Standalone HTML document for one card
pub fn render_card(grid: &Grid, title: &str, index: usize) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>");
    html.push_str(&escape_text(title));
    html.push_str("</title></head>\n<body>\n");
    html.push_str(&format!(
        "<div id=\"{}\" class=\"byngo-card\">\n<h1>{}</h1>\n",
        container_id(index),
        escape_text(title)
    ));

    html.push_str("<table class=\"mystyle\">\n<thead><tr>");
    for heading in grid::header(grid.size()) {
        html.push_str(&format!("<th>{heading}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in grid.rows() {
        html.push_str("<tr>");
        for square in row {
            html.push_str(&format!("<td>{square}</td>"));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</div>\n</body>\n</html>\n");
    html
}

/// A set of highlighted cards
#[derive(Debug, Clone)]
pub struct CardDeck {
    title: String,
    grids: Vec<Grid>,
    cards: Vec<String>,
}

impl CardDeck {
    pub fn generate(options: &CardOptions) -> Result<Self> {
        if options.players == 0 {
            return Err(CardError::NoPlayers);
        }

        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut grids = Vec::with_capacity(options.players);
        let mut cards = Vec::with_capacity(options.players);

        for index in 0..options.players {
            tracing::info!("Creating grid {} of {}", index + 1, options.players);

            let mut grid = grid::generate_grid(
                &mut rng,
                options.min,
                options.max,
                options.grid_size,
            )?;
            if options.free_space {
                grid::add_free_space(&mut rng, &mut grid);
            }

            cards.push(highlight_card(&grid, &options.title, index, options.policy)?);
            grids.push(grid);
        }

        Ok(Self {
            title: options.title.clone(),
            grids,
            cards,
        })
    }

    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    /// Highlighted card containers, one HTML fragment per card
    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// One page holding every card, a page break between each
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(self.cards.iter().map(String::len).sum::<usize>() + 512);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
        html.push_str(&escape_text(&self.title));
        html.push_str("</title>\n<style>\n");
        html.push_str(PAGE_STYLE);
        html.push_str("</style>\n</head>\n<body>\n");
        for card in &self.cards {
            html.push_str(card);
            html.push('\n');
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Render, highlight and cut out the container of a single card
fn highlight_card(
    grid: &Grid,
    title: &str,
    index: usize,
    policy: HighlightPolicy,
) -> Result<String> {
    let mut service = DomService::new();
    service.parse_html(&render_card(grid, title, index))?;
    service.highlight_cells(policy)?;

    let id = container_id(index);
    let container = service
        .arena()
        .find_by_id(&id)
        .ok_or(CardError::MissingContainer(id))?;

    Ok(DomSerializer::new().serialize_node(service.arena(), container)?)
}
