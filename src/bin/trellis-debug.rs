// src/bin/trellis-debug.rs

use anyhow::Result;
use clap::Parser;
use trellis_core::{
    Anchor, Background, Edges, LayoutAlignment, LayoutStyle, Modifier, NodeId, NodeKind, Tree,
};
use trellis_core::units::{hug, percent, px, space_between};
use trellis_render::{color, RecordingBackend};
use trellis_runtime::Engine;

#[derive(Parser)]
#[command(name = "trellis-debug")]
#[command(about = "Composes a demo tree and dumps the resolved hierarchy as text")]
struct Args {
    /// Display width in logical pixels
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Display height in logical pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Device pixel ratio for raster targets
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Show resolved positions and sizes
    #[arg(long)]
    show_layout: bool,

    /// Dump the recorded backend calls after the frame
    #[arg(long)]
    show_ops: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trellis_debug=info".parse()?),
        )
        .init();

    let mut engine = Engine::new(RecordingBackend::new(), args.width, args.height, args.scale);
    build_demo(&mut engine);
    engine.frame()?;

    let mut output = String::new();
    dump_node(&mut output, engine.tree(), engine.root(), 0, &args, true);
    print!("{}", output);

    if args.show_ops {
        println!("--- backend calls ---");
        for op in engine.backend().ops() {
            println!("{:?}", op);
        }
    }

    Ok(())
}

fn build_demo(engine: &mut Engine<RecordingBackend>) {
    engine.build(|ui| {
        ui.composition(
            "card",
            Modifier::new()
                .with_position(percent(0.5), percent(0.5))
                .with_anchor(Anchor::center())
                .with_size(px(400.0), px(300.0))
                .with_background(Background::Color(color::from_hex(0x202030FF))),
            |ui| {
                ui.auto_layout(
                    "toolbar",
                    Modifier::new().with_size(percent(1.0), px(48.0)),
                    LayoutStyle::horizontal()
                        .with_alignment(LayoutAlignment::Center)
                        .with_item_spacing(space_between()),
                    |ui| {
                        for label in ["File", "Edit", "View"] {
                            ui.text(
                                label,
                                Modifier::new().with_size(px(64.0), px(24.0)),
                                label,
                                14.0,
                                color::WHITE,
                            );
                        }
                    },
                );
                ui.auto_layout(
                    "body",
                    Modifier::new()
                        .with_y(px(48.0))
                        .with_size(percent(1.0), hug()),
                    LayoutStyle::vertical().with_padding(Edges::all(px(8.0))),
                    |ui| {
                        ui.text(
                            "title",
                            Modifier::new().with_size(px(200.0), px(32.0)),
                            "Resolved layout demo",
                            24.0,
                            color::WHITE,
                        );
                        ui.element(
                            "divider",
                            Modifier::new()
                                .with_size(percent(0.9), px(1.0))
                                .with_background(Background::Color(color::from_hex(0x44485CFF))),
                        );
                    },
                );
            },
        );
    });
}

fn dump_node(output: &mut String, tree: &Tree, id: NodeId, depth: usize, args: &Args, is_last: bool) {
    let node = tree.node(id);

    let tree_char = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };
    let indent = if depth == 0 {
        String::new()
    } else {
        "│   ".repeat(depth - 1) + tree_char
    };

    let kind = match node.kind {
        NodeKind::Element => "Element".to_string(),
        NodeKind::Composition(kind) => format!("{:?}", kind),
    };
    output.push_str(&format!("{}{} \"{}\"", indent, kind, node.name));

    if args.show_layout {
        output.push_str(&format!(
            " pos:({:.0},{:.0}) size:({:.0},{:.0})",
            node.x, node.y, node.width, node.height
        ));
        if node.raster.is_some() {
            output.push_str(" [cached]");
        }
    }
    output.push('\n');

    let child_count = node.children.len();
    for (i, &child) in node.children.iter().enumerate() {
        dump_node(output, tree, child, depth + 1, args, i == child_count - 1);
    }
}
