use super::*;

use crate::internal;

//-----------------------------------------------------------------------------

fn ids(values: &[u64]) -> Vec<SuperPathId> {
    values.iter().map(|x| SuperPathId(*x)).collect()
}

fn build_contig<'a>(graph: &'a Graph, entries: &EntryEdgeSet, segments: &[Segment]) -> ContigBuilder<'a> {
    let mut builder = ContigBuilder::new(graph);
    for segment in segments {
        builder.add_segment(entries, *segment);
    }
    builder
}

fn contigs_to_string(sg: &SuperGraph, graph: &Graph, params: &ContigParams) -> String {
    let mut output: Vec<u8> = Vec::new();
    let result = sg.print_contigs(graph, params, &mut output);
    assert!(result.is_ok(), "Failed to print contigs: {}", result.unwrap_err());
    String::from_utf8(output).unwrap()
}

fn linear_segments_to_string(graph: &Graph, params: &ContigParams) -> String {
    let mut output: Vec<u8> = Vec::new();
    let result = print_linear_segments(graph, params, &mut output);
    assert!(result.is_ok(), "Failed to print linear segments: {}", result.unwrap_err());
    String::from_utf8(output).unwrap()
}

//-----------------------------------------------------------------------------

#[test]
fn single_segments() {
    let (graph, sg) = internal::bubble_supergraph();
    let entries = sg.entries();

    // (segment, full sequence, truncated sequence, coverage)
    let truth = [
        (0, "AAGGGC", "AAGGGC", 1),
        (1, "AAGTCGGC", "AAGTCGGC", 1),
        (2, "ATAAAG", "ATA", 2),
        (3, "", "", 2),
        (4, "GCCCTT", "GCCCTT", 1),
        (5, "GCCGACTT", "GCCGACTT", 1),
        (6, "CTCA", "CTCA", 2),
        (7, "TGAGCC", "TGA", 2),
    ];
    for (rank, full, truncated, coverage) in truth {
        let builder = build_contig(&graph, entries, &[Segment::LinearPath(rank)]);
        assert_eq!(builder.sequence(), full, "Wrong sequence for segment {}", rank);
        assert_eq!(builder.truncated(), truncated, "Wrong truncated sequence for segment {}", rank);
        assert_eq!(builder.edges(), entries.length(rank as usize), "Wrong number of edges for segment {}", rank);
        assert_eq!(builder.min(), coverage, "Wrong minimum coverage for segment {}", rank);
        assert_eq!(builder.max(), coverage, "Wrong maximum coverage for segment {}", rank);
        assert_eq!(builder.mean(), coverage as f64, "Wrong mean coverage for segment {}", rank);
        assert_eq!(builder.std_dev(), 0.0, "Wrong coverage deviation for segment {}", rank);
    }
}

#[test]
fn multiple_segments() {
    let (graph, sg) = internal::bubble_supergraph();
    let entries = sg.entries();

    let builder = build_contig(&graph, entries, &[Segment::LinearPath(7), Segment::LinearPath(4), Segment::LinearPath(3)]);
    assert_eq!(builder.truncated(), internal::BUBBLE_SEQUENCES[0], "Wrong contig for the first sequence");
    assert_eq!(builder.min(), 1, "Wrong minimum coverage");
    assert_eq!(builder.max(), 2, "Wrong maximum coverage");
    assert!((builder.mean() - 5.0 / 3.0).abs() < 1e-9, "Wrong mean coverage: {}", builder.mean());
    assert!((builder.std_dev() - 0.4714045207910316).abs() < 1e-9, "Wrong coverage deviation: {}", builder.std_dev());

    let builder = build_contig(&graph, entries, &[Segment::LinearPath(7), Segment::LinearPath(5), Segment::LinearPath(3)]);
    assert_eq!(builder.truncated(), internal::BUBBLE_SEQUENCES[1], "Wrong contig for the second sequence");

    let builder = build_contig(&graph, entries, &[Segment::LinearPath(2), Segment::LinearPath(0), Segment::LinearPath(6)]);
    assert_eq!(builder.truncated(), "ATAAAGGGCTCA", "Wrong contig for the reverse complement");
}

#[test]
fn gaps_and_overlaps() {
    let (graph, sg) = internal::bubble_supergraph();
    let entries = sg.entries();

    let builder = build_contig(&graph, entries, &[Segment::LinearPath(7), Segment::Gap(2), Segment::LinearPath(3)]);
    assert_eq!(builder.truncated(), "TGAGCCNNCTTTAT", "Wrong contig with a gap");
    assert_eq!(builder.mean(), 2.0, "Gaps should not affect coverage");

    let builder = build_contig(&graph, entries, &[Segment::LinearPath(7), Segment::Gap(-2), Segment::LinearPath(3)]);
    assert_eq!(builder.truncated(), "TGAGCCTTAT", "Wrong contig with an overlap");

    let builder = build_contig(&graph, entries, &[Segment::LinearPath(7), Segment::Gap(-1), Segment::LinearPath(4)]);
    assert_eq!(builder.truncated(), "TGAGCCCCCTT", "Wrong contig with a one-base overlap");
    assert_eq!(builder.mean(), 1.5, "Wrong mean coverage with a one-base overlap");
    assert_eq!(builder.std_dev(), 0.5, "Wrong coverage deviation with a one-base overlap");

    // Unknown segments are ignored.
    let builder = build_contig(&graph, entries, &[Segment::LinearPath(7), Segment::Sequence(1), Segment::LinearPath(4), Segment::LinearPath(3)]);
    assert_eq!(builder.truncated(), internal::BUBBLE_SEQUENCES[0], "Sequence segments were not ignored");
}

#[test]
fn empty_contig() {
    let graph = internal::bubble_graph();
    let builder = ContigBuilder::new(&graph);
    assert!(builder.sequence().is_empty(), "Non-empty sequence");
    assert!(builder.truncated().is_empty(), "Non-empty truncated sequence");
    assert_eq!(builder.edges(), 0, "Wrong number of edges");
    assert_eq!(builder.min(), 0, "Wrong minimum coverage");
    assert_eq!(builder.mean(), 0.0, "Wrong mean coverage");
    assert_eq!(builder.std_dev(), 0.0, "Wrong coverage deviation");
}

#[test]
fn contig_info() {
    let (graph, mut sg) = internal::bubble_supergraph();
    let (fd, rc) = sg.link(&ids(&[7, 5, 3]));
    let (sequence, rc_id, mean) = sg.contig_info(&graph, fd);
    assert_eq!(sequence, internal::BUBBLE_SEQUENCES[1], "Wrong contig sequence");
    assert_eq!(rc_id, rc, "Wrong reverse complement");
    assert!((mean - 17.0 / 11.0).abs() < 1e-9, "Wrong mean coverage: {}", mean);
}

//-----------------------------------------------------------------------------

#[test]
fn entailment() {
    let a = [Segment::LinearPath(1), Segment::LinearPath(2), Segment::LinearPath(3)];
    assert!(entails(&a, &a[..1]), "Prefix is not entailed");
    assert!(entails(&a, &a[1..2]), "Middle is not entailed");
    assert!(entails(&a, &a[1..]), "Suffix is not entailed");
    assert!(entails(&a, &a), "Identical lists are not entailed");
    assert!(!entails(&a[..2], &a), "Longer list is entailed");
    assert!(!entails(&a, &[Segment::LinearPath(1), Segment::LinearPath(3)]), "Non-contiguous list is entailed");
    assert!(!entails(&a, &[]), "Empty list is entailed");
}

#[test]
fn entailed_paths() {
    let (_, mut sg) = internal::bubble_supergraph();
    assert!(sg.entailed_paths().is_empty(), "Singleton paths are entailed");

    sg.link(&ids(&[7, 4, 3]));
    let expected: BTreeSet<SuperPathId> = ids(&[0, 2, 3, 4, 6, 7]).into_iter().collect();
    assert_eq!(sg.entailed_paths(), expected, "Wrong entailed paths");

    // The later copy of an identical path is entailed.
    sg.link(&ids(&[7, 4, 3]));
    let expected: BTreeSet<SuperPathId> = ids(&[0, 2, 3, 4, 6, 7, 10, 11]).into_iter().collect();
    assert_eq!(sg.entailed_paths(), expected, "Wrong entailed paths with a duplicate");
}

//-----------------------------------------------------------------------------

#[test]
fn fasta_output() {
    let (graph, mut sg) = internal::bubble_supergraph();
    sg.link(&ids(&[7, 4, 3]));

    let params = ContigParams::default();
    let output = contigs_to_string(&sg, &graph, &params);
    assert_eq!(output, ">1\nAAGTCGGC\n>8\nTGAGCCCTTTAT\n", "Wrong FASTA output");

    let params = ContigParams { line_width: 5, ..Default::default() };
    let output = contigs_to_string(&sg, &graph, &params);
    assert_eq!(output, ">1\nAAGTC\nGGC\n>8\nTGAGC\nCCTTT\nAT\n", "Wrong FASTA output with short lines");

    let params = ContigParams { min_length: 10, ..Default::default() };
    let output = contigs_to_string(&sg, &graph, &params);
    assert_eq!(output, ">8\nTGAGCCCTTTAT\n", "Wrong FASTA output with minimum length");

    let params = ContigParams { verbose_headers: true, ..Default::default() };
    let output = contigs_to_string(&sg, &graph, &params);
    let expected = ">1 8,[5],[1],5,[6],1,1,1,0\nAAGTCGGC\n>8 12,[3:3:3],[7:4:3],9,[],1,2,1.66667,0.471405\nTGAGCCCTTTAT\n";
    assert_eq!(output, expected, "Wrong FASTA output with verbose headers");
}

#[test]
fn all_contigs() {
    let (graph, mut sg) = internal::bubble_supergraph();
    sg.link(&ids(&[7, 4, 3]));

    // Reverse complements but no entailed paths.
    let params = ContigParams { print_rcs: true, line_width: 0, ..Default::default() };
    let output = contigs_to_string(&sg, &graph, &params);
    assert_eq!(output, ">1\nAAGTCGGC\n>9\nATAAAGGGCTCA\n>5\nGCCGACTT\n>8\nTGAGCCCTTTAT\n", "Wrong output with reverse complements");

    // Everything in adjacency order; segment 3 has an empty contig.
    let params = ContigParams { print_rcs: true, print_entailed: true, line_width: 0, ..Default::default() };
    let output = contigs_to_string(&sg, &graph, &params);
    let headers: Vec<&str> = output.lines().filter(|line| line.starts_with('>')).collect();
    assert_eq!(headers, vec![">0", ">1", ">2", ">9", ">3", ">4", ">5", ">6", ">7", ">8"], "Wrong contigs with everything printed");
    assert!(output.contains(">3\n>4\nGCCCTT\n"), "Wrong output for an empty contig:\n{}", output);
}

#[test]
fn table_output() {
    let (graph, mut sg) = internal::bubble_supergraph();
    sg.link(&ids(&[7, 4, 3]));

    let params = ContigParams { omit_sequence: true, ..Default::default() };
    let output = contigs_to_string(&sg, &graph, &params);
    let expected = "Id\tLength\tSegmentLengths\tSegmentStarts\tRevCompId\tSuccessorIds\tMinCov\tMaxCov\tMeanCov\tStdDevCov\n\
        1\t8\t[5]\t[1]\t5\t[6]\t1\t1\t1\t0\n\
        8\t12\t[3:3:3]\t[7:4:3]\t9\t[]\t1\t2\t1.66667\t0.471405\n";
    assert_eq!(output, expected, "Wrong table output");
}

#[test]
fn gap_segments_in_output() {
    let (graph, mut sg) = internal::bubble_supergraph();
    let gap = sg.gap_path(2);
    let (fd, _) = sg.link(&[SuperPathId(7), gap, SuperPathId(3)]);
    assert_eq!(fd, SuperPathId(10), "Unexpected identifier for the linked path");

    let params = ContigParams { omit_sequence: true, ..Default::default() };
    let output = contigs_to_string(&sg, &graph, &params);
    assert!(output.contains("\n10\t14\t[3:2:3]\t[7:2g:3]\t11\t[]\t2\t2\t2\t0\n"), "Wrong table row for a path with a gap:\n{}", output);
}

//-----------------------------------------------------------------------------

#[test]
fn linear_segments() {
    let graph = internal::bubble_graph();

    let params = ContigParams::default();
    let output = linear_segments_to_string(&graph, &params);
    assert_eq!(output, ">1\nAAGGGC\n>2\nAAGTCGGC\n>3\nATA\n>4\nTCA\n", "Wrong linear segments");

    let params = ContigParams { min_coverage: 2, verbose_headers: true, ..Default::default() };
    let output = linear_segments_to_string(&graph, &params);
    assert_eq!(output, ">1 6:2:2:2:0\nATA\n>2 6:2:2:2:0\nTCA\n", "Wrong linear segments with minimum coverage");

    let params = ContigParams { min_length: 4, omit_sequence: true, ..Default::default() };
    let output = linear_segments_to_string(&graph, &params);
    let expected = "Number\tLength\tMinCov\tMaxCov\tMeanCov\tStdDevCov\n1\t6\t1\t1\t1\t0\n2\t8\t1\t1\t1\t0\n";
    assert_eq!(output, expected, "Wrong linear segment table");
}

#[test]
fn float_formatting() {
    assert_eq!(format_float(0.0), "0", "Wrong zero");
    assert_eq!(format_float(1.0), "1", "Wrong integer");
    assert_eq!(format_float(1.5), "1.5", "Wrong fraction");
    assert_eq!(format_float(5.0 / 3.0), "1.66667", "Wrong rounding");
    assert_eq!(format_float(0.4714045207910316), "0.471405", "Wrong small value");
    assert_eq!(format_float(123456.7), "123457", "Wrong large value");
}

//-----------------------------------------------------------------------------
