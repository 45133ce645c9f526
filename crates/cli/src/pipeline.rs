//! Deck composition: generated text slides plus placed figures.

use docdeck_core::normalize::truncate_words;
use docdeck_core::placement::{self, tokenize};
use docdeck_core::response::parse_topics;
use docdeck_core::{
    ContentItem, Deck, DeckSlide, Figure, FigureKind, FigurePlacer, FigureType, Generation,
    ImagePlacement, MatchMode, PlacementDecision, Result, SlideParser, SlideVisual, TextSlide,
    Topic,
};
use docdeck_llm::SlideGenerator;

/// Words kept when a figure's paragraph becomes its slide title.
const FIGURE_TITLE_WORDS: usize = 12;

/// Opening words a segment must share with a topic to switch to it.
const TOPIC_MATCH_WORDS: usize = 3;

/// How figures are matched to generated slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Score every figure against all generated slides.
    #[default]
    Matched,
    /// Attach an image to the last slide of the text right before it.
    Sequential,
}

/// A composed deck and where each figure ended up.
///
/// Decisions refer to positions in the final deck.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub deck: Deck,
    pub placements: Vec<PlacementDecision>,
}

/// A figure waiting for placement.
struct PendingFigure {
    figure: Figure,
    /// Content slides generated before the figure.
    anchor: usize,
    /// The item right before the figure was text that produced slides.
    follows_slides: bool,
}

/// Builds decks from document content.
#[derive(Debug, Clone, Default)]
pub struct DeckBuilder {
    layout: LayoutMode,
    placer: FigurePlacer,
    parser: SlideParser,
    topic: String,
    topics: Vec<Topic>,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.placer = self.placer.with_match_mode(mode);
        self
    }

    pub fn with_max_bullets(mut self, max_bullets: usize) -> Self {
        self.parser = self.parser.with_max_bullets(max_bullets);
        self
    }

    /// Topic sent with every segment that does not open a detected topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Detected topics; a segment starting with a topic's first opening
    /// words switches the current topic.
    pub fn with_topics(mut self, topics: Vec<Topic>) -> Self {
        self.topics = topics;
        self
    }

    /// Compose a deck from `items`, generating slide text with `generator`.
    ///
    /// A leading text item becomes the title slide, together with an image
    /// directly after it. Segments the generator fails on or rejects are
    /// skipped.
    ///
    /// Fails with [`Error::InvalidInput`](docdeck_core::Error::InvalidInput)
    /// before any generation when the figures are invalid.
    pub fn build(&self, items: &[ContentItem], generator: &dyn SlideGenerator) -> Result<BuildOutcome> {
        let figures: Vec<Figure> = items
            .iter()
            .filter_map(|item| match item {
                ContentItem::Figure(figure) => Some(figure.clone()),
                ContentItem::Text(_) => None,
            })
            .collect();
        placement::validate(&figures)?;

        let mut rest = items;
        let mut title_slide = None;
        let mut title_placement = None;

        if let Some((ContentItem::Text(title), tail)) = rest.split_first() {
            let mut slide = DeckSlide::title_only(title.clone());
            rest = tail;
            if let Some((ContentItem::Figure(figure), tail)) = rest.split_first() {
                // Tables always get a slide of their own
                if figure.figure_type() == FigureType::Image {
                    slide = slide.with_visual(SlideVisual::standalone(figure));
                    title_placement = Some(PlacementDecision::on_slide(figure, 0));
                    rest = tail;
                }
            }
            title_slide = Some(slide);
        }

        let mut content: Vec<DeckSlide> = Vec::new();
        let mut pending: Vec<PendingFigure> = Vec::new();
        let mut follows_slides = false;
        let mut topic = self.topic.as_str();

        for item in rest {
            match item {
                ContentItem::Text(text) => {
                    if let Some(found) = self.topic_opened_by(text) {
                        log::debug!("Topic: {}", found.name);
                        topic = found.name.as_str();
                    }
                    let slides = self.generate(generator, topic, text);
                    follows_slides = !slides.is_empty();
                    content.extend(slides);
                }
                ContentItem::Figure(figure) => {
                    pending.push(PendingFigure {
                        figure: figure.clone(),
                        anchor: content.len(),
                        follows_slides,
                    });
                    follows_slides = false;
                }
            }
        }

        let targets = match self.layout {
            LayoutMode::Matched => self.matched_targets(&pending, &content)?,
            LayoutMode::Sequential => pending.iter().map(sequential_target).collect(),
        };

        // One figure per slide; later figures aimed at a taken slide get their own
        let mut attached = Vec::with_capacity(pending.len());
        let mut own_slides = Vec::new();
        for (item, target) in pending.iter().zip(targets) {
            match target {
                Some(index) if content[index].visual.is_none() => {
                    content[index].visual = Some(attached_visual(&item.figure));
                    attached.push(Some(index));
                }
                other => {
                    if let Some(index) = other {
                        log::debug!(
                            "Slide {} already holds a figure; figure {} gets its own slide",
                            index,
                            item.figure.id
                        );
                    }
                    own_slides.push((item.anchor, own_slide(&item.figure)));
                    attached.push(None);
                }
            }
        }

        let mut deck = Deck::new();
        if let Some(slide) = title_slide {
            deck.add_slide(slide);
        }
        let content_count = content.len();
        let mut deck_positions = Vec::with_capacity(content_count);
        let mut own_slides = own_slides.into_iter().peekable();
        for (index, slide) in content.into_iter().enumerate() {
            while let Some((_, own)) = own_slides.next_if(|(anchor, _)| *anchor <= index) {
                deck.add_slide(own);
            }
            deck_positions.push(deck.len());
            deck.add_slide(slide);
        }
        for (_, own) in own_slides {
            deck.add_slide(own);
        }

        let mut placements: Vec<PlacementDecision> = title_placement.into_iter().collect();
        for (item, target) in pending.iter().zip(attached) {
            placements.push(match target {
                Some(index) => PlacementDecision::on_slide(&item.figure, deck_positions[index]),
                None => PlacementDecision::standalone(&item.figure),
            });
        }

        log::info!(
            "Built {} slides ({} generated, {} figures)",
            deck.len(),
            content_count,
            placements.len()
        );
        Ok(BuildOutcome { deck, placements })
    }

    fn generate(&self, generator: &dyn SlideGenerator, topic: &str, segment: &str) -> Vec<DeckSlide> {
        match generator.generate_slides(topic, segment) {
            Ok(Generation::Success(text)) => {
                let slides = self.parser.parse(&text);
                log::debug!("{} produced {} slides", generator.name(), slides.len());
                slides
            }
            Ok(Generation::Rejected(reason)) => {
                log::info!(
                    "Skipping segment '{}': {}",
                    truncate_words(segment, 8),
                    reason
                );
                Vec::new()
            }
            Err(e) => {
                log::warn!(
                    "Generation failed for segment '{}': {}",
                    truncate_words(segment, 8),
                    e
                );
                Vec::new()
            }
        }
    }

    fn matched_targets(&self, pending: &[PendingFigure], content: &[DeckSlide]) -> Result<Vec<Option<usize>>> {
        let figures: Vec<Figure> = pending.iter().map(|p| p.figure.clone()).collect();
        let slides: Vec<TextSlide> = content.iter().map(DeckSlide::to_text_slide).collect();
        let decisions = self.placer.decide(&figures, &slides)?;
        Ok(decisions.into_iter().map(|d| d.slide_index).collect())
    }

    fn topic_opened_by(&self, text: &str) -> Option<&Topic> {
        let words = tokenize(text);
        self.topics.iter().find(|topic| {
            let opening = tokenize(&topic.opening);
            let needed = TOPIC_MATCH_WORDS.min(opening.len());
            needed > 0 && words.len() >= needed && words[..needed] == opening[..needed]
        })
    }
}

fn sequential_target(item: &PendingFigure) -> Option<usize> {
    let is_image = matches!(item.figure.kind, FigureKind::Image { .. });
    (is_image && item.follows_slides && item.anchor > 0).then(|| item.anchor - 1)
}

/// The visual for a figure sharing a slide with generated text.
fn attached_visual(figure: &Figure) -> SlideVisual {
    match &figure.kind {
        FigureKind::Image { path } => SlideVisual::Image {
            path: path.clone(),
            placement: ImagePlacement::Inline,
        },
        FigureKind::Table { rows } => SlideVisual::Table { rows: rows.clone() },
    }
}

fn own_slide(figure: &Figure) -> DeckSlide {
    let title = match figure.kind {
        FigureKind::Image { .. } => truncate_words(&figure.paragraph_text, FIGURE_TITLE_WORDS),
        FigureKind::Table { .. } => format!("Table {}", figure.id),
    };
    DeckSlide::title_only(title).with_visual(SlideVisual::standalone(figure))
}

/// Ask the generator for the document's key topics. Failures leave the
/// deck without topics.
pub fn detect_topics(generator: &dyn SlideGenerator, document: &str) -> Vec<Topic> {
    match generator.extract_topics(document) {
        Ok(Generation::Success(text)) => {
            let topics = parse_topics(&text);
            log::info!("Detected {} topics", topics.len());
            topics
        }
        Ok(Generation::Rejected(reason)) => {
            log::warn!("Topic detection rejected: {}", reason);
            Vec::new()
        }
        Err(e) => {
            log::warn!("Topic detection failed: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_core::Error;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Answers `**<segment>**\n- <segment>`, rejects segments starting with
    /// "REJECT", and fails on segments starting with "FAIL".
    #[derive(Default)]
    struct ScriptedGenerator {
        topics: Option<String>,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl SlideGenerator for ScriptedGenerator {
        fn generate_slides(&self, topic: &str, segment: &str) -> Result<Generation> {
            self.calls
                .borrow_mut()
                .push((topic.to_string(), segment.to_string()));
            if segment.starts_with("REJECT") {
                Ok(Generation::Rejected("please provide".to_string()))
            } else if segment.starts_with("FAIL") {
                Err(Error::GenerationError("connection reset".to_string()))
            } else {
                Ok(Generation::Success(format!("**{}**\n- {}", segment, segment)))
            }
        }

        fn extract_topics(&self, _document: &str) -> Result<Generation> {
            match &self.topics {
                Some(text) => Ok(Generation::Success(text.clone())),
                None => Err(Error::GenerationError("offline".to_string())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn text(value: &str) -> ContentItem {
        ContentItem::Text(value.to_string())
    }

    fn image(id: u32, paragraph: &str) -> ContentItem {
        ContentItem::Figure(Figure::image(id, format!("figs/figure_{}.png", id), paragraph))
    }

    fn table(id: u32) -> ContentItem {
        ContentItem::Figure(Figure::table(
            id,
            vec![vec!["a".to_string(), "b".to_string()]],
            "",
        ))
    }

    fn titles(deck: &Deck) -> Vec<&str> {
        deck.slides.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_empty_content() {
        let outcome = DeckBuilder::new()
            .build(&[], &ScriptedGenerator::default())
            .unwrap();
        assert!(outcome.deck.is_empty());
        assert!(outcome.placements.is_empty());
    }

    #[test]
    fn test_title_slide_takes_following_figure() {
        let items = vec![text("Annual Report"), image(1, "cover"), text("Revenue grew")];
        let generator = ScriptedGenerator::default();
        let outcome = DeckBuilder::new().build(&items, &generator).unwrap();

        assert_eq!(titles(&outcome.deck), vec!["Annual Report", "Revenue grew"]);
        assert_eq!(
            outcome.deck.slides[0].visual,
            Some(SlideVisual::Image {
                path: PathBuf::from("figs/figure_1.png"),
                placement: ImagePlacement::Centered
            })
        );
        assert_eq!(outcome.placements, vec![PlacementDecision::on_slide(
            &Figure::image(1, "figs/figure_1.png", "cover"),
            0
        )]);

        // The title text is not sent for generation
        assert_eq!(generator.calls.borrow().len(), 1);
    }

    #[test]
    fn test_table_after_title_gets_own_slide() {
        let items = vec![text("Annual Report"), table(1), text("Revenue grew")];
        let outcome = DeckBuilder::new()
            .build(&items, &ScriptedGenerator::default())
            .unwrap();

        assert_eq!(
            titles(&outcome.deck),
            vec!["Annual Report", "Table 1", "Revenue grew"]
        );
        assert_eq!(outcome.deck.slides[0].visual, None);
        assert_eq!(outcome.placements.len(), 1);
        assert!(outcome.placements[0].own_slide);
        assert_eq!(outcome.placements[0].slide_index, None);
    }

    #[test]
    fn test_rejected_and_failed_segments_are_skipped() {
        let items = vec![
            text("Report"),
            text("REJECT this"),
            text("Costs fell"),
            text("FAIL here"),
        ];
        let outcome = DeckBuilder::new()
            .build(&items, &ScriptedGenerator::default())
            .unwrap();
        assert_eq!(titles(&outcome.deck), vec!["Report", "Costs fell"]);
    }

    #[test]
    fn test_matched_image_goes_inline_on_best_slide() {
        let items = vec![
            text("Report"),
            text("Revenue grew"),
            text("Costs fell"),
            image(1, "The costs chart"),
        ];
        let outcome = DeckBuilder::new()
            .build(&items, &ScriptedGenerator::default())
            .unwrap();

        assert_eq!(outcome.deck.len(), 3);
        assert_eq!(
            outcome.deck.slides[2].visual,
            Some(SlideVisual::Image {
                path: PathBuf::from("figs/figure_1.png"),
                placement: ImagePlacement::Inline
            })
        );
        assert_eq!(outcome.placements[0].slide_index, Some(2));
        assert!(!outcome.placements[0].own_slide);
    }

    #[test]
    fn test_second_figure_on_occupied_slide_gets_own_slide() {
        let items = vec![
            text("Report"),
            text("Revenue grew"),
            image(1, "revenue by region"),
            text("Costs fell"),
            image(2, "revenue by product"),
        ];
        let outcome = DeckBuilder::new()
            .build(&items, &ScriptedGenerator::default())
            .unwrap();

        // Figure 2 lands after "Costs fell", the slide preceding it
        assert_eq!(
            titles(&outcome.deck),
            vec!["Report", "Revenue grew", "Costs fell", "revenue by product"]
        );
        assert_eq!(outcome.placements[0].slide_index, Some(1));
        assert!(outcome.placements[1].own_slide);
        assert_eq!(outcome.placements[1].slide_index, None);
        assert_eq!(
            outcome.deck.slides[3].visual,
            Some(SlideVisual::Image {
                path: PathBuf::from("figs/figure_2.png"),
                placement: ImagePlacement::Centered
            })
        );
    }

    #[test]
    fn test_tables_and_unmatched_images_follow_preceding_slide() {
        let items = vec![
            text("Report"),
            text("Revenue grew"),
            table(1),
            image(2, "zzz"),
            text("Costs fell"),
        ];
        let outcome = DeckBuilder::new()
            .build(&items, &ScriptedGenerator::default())
            .unwrap();

        assert_eq!(
            titles(&outcome.deck),
            vec!["Report", "Revenue grew", "Table 1", "zzz", "Costs fell"]
        );
        assert!(outcome.placements.iter().all(|p| p.own_slide));
        assert!(matches!(
            outcome.deck.slides[2].visual,
            Some(SlideVisual::Table { .. })
        ));
    }

    #[test]
    fn test_figures_before_any_content_slide_come_first() {
        let items = vec![image(1, "unrelated"), text("Revenue grew")];
        let outcome = DeckBuilder::new()
            .build(&items, &ScriptedGenerator::default())
            .unwrap();
        assert_eq!(titles(&outcome.deck), vec!["unrelated", "Revenue grew"]);
    }

    #[test]
    fn test_sequential_attaches_to_preceding_text() {
        let items = vec![
            text("Report"),
            text("Revenue grew"),
            image(1, "nothing in common"),
            image(2, "revenue again"),
            text("Costs fell"),
        ];
        let outcome = DeckBuilder::new()
            .with_layout(LayoutMode::Sequential)
            .build(&items, &ScriptedGenerator::default())
            .unwrap();

        assert_eq!(
            titles(&outcome.deck),
            vec!["Report", "Revenue grew", "revenue again", "Costs fell"]
        );
        assert_eq!(outcome.placements[0].slide_index, Some(1));
        assert!(outcome.placements[1].own_slide);
    }

    #[test]
    fn test_duplicate_figure_ids_rejected() {
        let items = vec![text("Report"), text("Revenue"), image(1, "a"), image(1, "b")];
        let result = DeckBuilder::new().build(&items, &ScriptedGenerator::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        // The title slide's image is checked too, before anything is generated
        let items = vec![text("Report"), image(1, "a"), text("Revenue"), image(1, "b")];
        let generator = ScriptedGenerator::default();
        let result = DeckBuilder::new().build(&items, &generator);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(generator.calls.borrow().is_empty());

        let result = DeckBuilder::new()
            .with_layout(LayoutMode::Sequential)
            .build(&items, &ScriptedGenerator::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_bullet_cap_applies() {
        struct Wordy;
        impl SlideGenerator for Wordy {
            fn generate_slides(&self, _topic: &str, _segment: &str) -> Result<Generation> {
                Ok(Generation::Success("**Many**\n- 1\n- 2\n- 3\n- 4".to_string()))
            }
            fn extract_topics(&self, _document: &str) -> Result<Generation> {
                Ok(Generation::Rejected("no".to_string()))
            }
            fn name(&self) -> &str {
                "wordy"
            }
        }

        let items = vec![text("Report"), text("Body")];
        let outcome = DeckBuilder::new().with_max_bullets(2).build(&items, &Wordy).unwrap();
        assert_eq!(outcome.deck.slides[1].bullets, vec!["1", "2"]);
    }

    #[test]
    fn test_topics_switch_at_section_openings() {
        let generator = ScriptedGenerator {
            topics: Some("**Finance**\nRevenue grew in every region\n**People**\nHiring slowed".to_string()),
            ..Default::default()
        };
        let topics = detect_topics(&generator, "whole document");
        assert_eq!(topics.len(), 2);

        let items = vec![
            text("Report"),
            text("Intro words"),
            text("Revenue grew in every region this year"),
            text("Margins held"),
            text("Revenue"),
            text("Hiring slowed across teams"),
        ];
        DeckBuilder::new()
            .with_topic("General")
            .with_topics(topics)
            .build(&items, &generator)
            .unwrap();

        // A one-word heading sharing only the first word does not switch
        let used: Vec<String> = generator.calls.borrow().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(used, vec!["General", "Finance", "Finance", "Finance", "People"]);
    }

    #[test]
    fn test_detect_topics_failure_is_empty() {
        assert!(detect_topics(&ScriptedGenerator::default(), "doc").is_empty());
    }
}
