use litmerge_core::{
    AwardAttributes, AwardStatus, BestsellerAttributes, BibliographicAttributes, MatchMethod,
    ReceptionAttributes, SourceAttributes, SourceCollections, SourceRecord, SourceTag,
};
use litmerge_resolve::{ResolveOptions, Resolver};

fn award(title: &str, author: &str, award: &str, status: AwardStatus) -> SourceRecord {
    SourceRecord::new(
        title,
        author,
        SourceAttributes::Award(AwardAttributes {
            award: award.to_string(),
            status,
            publisher: None,
        }),
    )
}

fn bibliographic(title: &str, author: &str) -> SourceRecord {
    SourceRecord::new(
        title,
        author,
        SourceAttributes::BibliographicApi(BibliographicAttributes {
            publisher: Some("Doubleday".to_string()),
            page_count: Some(224),
            categories: vec!["Fiction".to_string()],
            ..BibliographicAttributes::default()
        }),
    )
}

fn reception(title: &str, author: &str, ratings_average: f64) -> SourceRecord {
    SourceRecord::new(
        title,
        author,
        SourceAttributes::ReceptionApi(ReceptionAttributes {
            ratings_average: Some(ratings_average),
            ratings_count: 120,
            subjects: vec!["fiction".to_string(), "Florida".to_string()],
            ..ReceptionAttributes::default()
        }),
    )
}

fn bestseller(title: &str, author: &str, rank: u32, weeks: u32, date: &str) -> SourceRecord {
    SourceRecord::new(
        title,
        author,
        SourceAttributes::BestsellerApi(BestsellerAttributes {
            rank: Some(rank),
            weeks_on_list: weeks,
            bestseller_date: Some(date.to_string()),
            list_name: Some("hardcover-fiction".to_string()),
            ..BestsellerAttributes::default()
        }),
    )
}

fn resolve(records: Vec<SourceRecord>) -> litmerge_resolve::MergeOutcome {
    let collections: SourceCollections = records.into_iter().collect();
    Resolver::new(ResolveOptions::default())
        .unwrap()
        .run(&collections)
}

#[test]
fn identifier_match_across_isbn_formats() {
    let outcome = resolve(vec![
        award(
            "The Nickel Boys",
            "Colson Whitehead",
            "Pulitzer Prize",
            AwardStatus::Winner,
        )
        .with_year(2020)
        .with_identifier("9780385537070"),
        bibliographic("Nickel Boys: A Novel", "Colson Whitehead").with_identifier("0385537077"),
    ]);

    let books = &outcome.dataset.books;
    assert_eq!(books.len(), 1);
    let book = &books[0];
    assert_eq!(book.sources, vec![SourceTag::Award, SourceTag::BibliographicApi]);
    assert_eq!(book.award_count, 1);
    assert_eq!(book.match_method, Some(MatchMethod::Identifier));
    assert_eq!(book.isbns, vec!["9780385537070".to_string()]);
    assert_eq!(book.isbn_10.as_deref(), Some("0385537077"));
    assert_eq!(book.title.as_deref(), Some("The Nickel Boys"));
    assert_eq!(book.publisher.as_deref(), Some("Doubleday"));
}

#[test]
fn fuzzy_match_tolerates_whitespace() {
    let outcome = resolve(vec![
        award(
            "The Nickel Boys",
            "Colson Whitehead",
            "Pulitzer Prize",
            AwardStatus::Winner,
        ),
        bibliographic("The Nickel Boys", "Colson  Whitehead"),
    ]);

    let books = &outcome.dataset.books;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].match_method, Some(MatchMethod::Fuzzy));
    let score = books[0].match_score.unwrap();
    assert!(score.title >= 0.85 && score.author >= 0.85);
}

#[test]
fn dissimilar_records_stay_apart() {
    let outcome = resolve(vec![
        award("Book A", "Author X", "Booker Prize", AwardStatus::Longlist),
        bibliographic("Completely Different Title", "Author Y"),
    ]);

    let books = &outcome.dataset.books;
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].sources, vec![SourceTag::Award]);
    assert_eq!(books[1].sources, vec![SourceTag::BibliographicApi]);
    assert!(books.iter().all(|b| b.match_method.is_none()));

    let award_stats = outcome.report.source(SourceTag::Award).unwrap();
    assert_eq!(award_stats.matched, 0);
    assert_eq!(award_stats.unmatched, 1);
}

#[test]
fn unclaimed_bestseller_is_emitted_and_reported() {
    let outcome = resolve(vec![
        award("Hamnet", "Maggie O'Farrell", "Women's Prize", AwardStatus::Winner),
        bestseller("Where the Crawdads Sing", "Delia Owens", 1, 90, "2020-06-07"),
    ]);

    let books = &outcome.dataset.books;
    assert_eq!(books.len(), 2);
    let residual: Vec<_> = books
        .iter()
        .filter(|b| b.sources == vec![SourceTag::BestsellerApi])
        .collect();
    assert_eq!(residual.len(), 1);
    assert!(residual[0].awards.is_empty());

    let unmatched = outcome
        .unmatched
        .iter()
        .find(|c| c.metadata.source == SourceTag::BestsellerApi)
        .unwrap();
    assert_eq!(unmatched.entries.len(), 1);
    assert_eq!(
        unmatched.entries[0].title.as_deref(),
        Some("Where the Crawdads Sing")
    );
}

#[test]
fn repeated_runs_are_byte_identical() {
    let records = vec![
        award("Shuggie Bain", "Douglas Stuart", "Booker Prize", AwardStatus::Longlist)
            .with_year(2020),
        award("Shuggie Bain", "Douglas Stuart", "Booker Prize", AwardStatus::Winner)
            .with_year(2020),
        award("Piranesi", "Susanna Clarke", "Women's Prize", AwardStatus::Winner).with_year(2021),
        bibliographic("Shuggie Bain", "Douglas Stuart").with_identifier("9780802148049"),
        reception("Piranesi", "Susanna Clarke", 4.1),
        bestseller("Piranesi", "Susanna Clarke", 3, 2, "2020-10-04").with_identifier("163557563X"),
        bestseller("Piranesi", "Susanna Clarke", 5, 3, "2020-10-11").with_identifier("163557563X"),
        bestseller("The Vanishing Half", "Brit Bennett", 1, 10, "2020-08-02"),
    ];
    let collections: SourceCollections = records.into_iter().collect();
    let resolver = Resolver::new(ResolveOptions::default()).unwrap();

    let first = resolver.run(&collections);
    let second = resolver.run(&collections);

    assert_eq!(
        serde_json::to_string(&first.dataset).unwrap(),
        serde_json::to_string(&second.dataset).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.unmatched).unwrap(),
        serde_json::to_string(&second.unmatched).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.report).unwrap(),
        serde_json::to_string(&second.report).unwrap()
    );
}

#[test]
fn derived_award_fields_follow_awards_array() {
    let outcome = resolve(vec![
        award("Shuggie Bain", "Douglas Stuart", "Booker Prize", AwardStatus::Longlist),
        award("Shuggie Bain", "Douglas Stuart", "Booker Prize", AwardStatus::Shortlist),
        award("Shuggie Bain", "Douglas Stuart", "Booker Prize", AwardStatus::Winner),
        award("Real Life", "Brandon Taylor", "Booker Prize", AwardStatus::Shortlist),
        award("Burnt Sugar", "Avni Doshi", "Booker Prize", AwardStatus::Longlist),
    ]);

    let books = &outcome.dataset.books;
    assert_eq!(books.len(), 3);
    for book in books {
        assert_eq!(book.award_count, book.awards.len());
        assert!(!(book.won_award && book.shortlisted));
    }
    assert!(books[0].won_award);
    assert_eq!(books[0].award_count, 3);
    assert!(books[1].shortlisted);
    assert!(!books[2].won_award && !books[2].shortlisted);
}

#[test]
fn weekly_bestseller_entries_accumulate_on_one_book() {
    let outcome = resolve(vec![
        award("Piranesi", "Susanna Clarke", "Women's Prize", AwardStatus::Winner)
            .with_identifier("9781635575637"),
        reception("Piranesi", "Susanna Clarke", 4.1),
        bestseller("Piranesi", "Susanna Clarke", 5, 3, "2020-10-11").with_identifier("163557563X"),
        bestseller("Piranesi", "Susanna Clarke", 3, 2, "2020-10-04").with_identifier("163557563X"),
    ]);

    let books = &outcome.dataset.books;
    assert_eq!(books.len(), 2);
    let piranesi = &books[0];
    let commercial = piranesi.commercial.as_ref().unwrap();
    assert_eq!(commercial.bestseller_appearances, 2);
    assert_eq!(commercial.total_weeks_on_list, 5);
    assert_eq!(commercial.highest_rank, Some(3));
    assert_eq!(
        commercial.bestseller_dates,
        vec!["2020-10-04".to_string(), "2020-10-11".to_string()]
    );
    // The identifier link comes first, so the fuzzy reception candidate stays out.
    assert!(piranesi.reception.is_none());
    assert_eq!(books[1].sources, vec![SourceTag::ReceptionApi]);
}

#[test]
fn configurable_primary_source_drives_matching() {
    let collections: SourceCollections = vec![
        award("Hamnet", "Maggie O'Farrell", "Women's Prize", AwardStatus::Winner),
        bibliographic("Hamnet", "Maggie O'Farrell"),
        reception("Hamnet", "Maggie O'Farrell", 4.0),
    ]
    .into_iter()
    .collect();
    let options = ResolveOptions {
        primary_source: SourceTag::BibliographicApi,
        ..ResolveOptions::default()
    };

    let outcome = Resolver::new(options).unwrap().run(&collections);
    assert_eq!(outcome.dataset.metadata.primary_source, SourceTag::BibliographicApi);
    assert_eq!(outcome.dataset.books.len(), 2);
    let unmatched_sources: Vec<SourceTag> =
        outcome.unmatched.iter().map(|c| c.metadata.source).collect();
    assert_eq!(
        unmatched_sources,
        vec![
            SourceTag::Award,
            SourceTag::ReceptionApi,
            SourceTag::BestsellerApi
        ]
    );
}
