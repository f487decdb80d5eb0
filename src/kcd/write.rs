use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::kcd::types::{
    errors::KcdWriteError,
    message::Message,
    network::{Bus, Network},
    signal::{Endianness, LabelSet, Multiplex, Signal, Value, ValueType},
};

const KCD_NAMESPACE: &str = "http://kayak.2codeornot2code.org/1.0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "Definition.xsd";

/// Output options of the KCD writer.
#[derive(Clone, Debug)]
pub struct KcdOptions {
    /// Indent nested elements by two spaces.
    pub pretty: bool,
    /// Compress the file with gzip (`.kcd.gz`).
    pub gzip: bool,
}

impl Default for KcdOptions {
    fn default() -> Self {
        KcdOptions {
            pretty: true,
            gzip: false,
        }
    }
}

type XmlWriter = Writer<Vec<u8>>;

/// Renders `network` as a KCD document. `options.gzip` is ignored here.
pub fn to_string(network: &Network, options: &KcdOptions) -> Result<String, KcdWriteError> {
    let bytes: Vec<u8> = to_bytes(network, options)?;
    String::from_utf8(bytes).map_err(|e| KcdWriteError::Xml {
        message: e.to_string(),
    })
}

/// Writes `network` as a KCD file at `path`.
///
/// Creates intermediate directories when needed and gzips the output
/// when `options.gzip` is set.
pub fn to_file(network: &Network, path: &str, options: &KcdOptions) -> Result<(), KcdWriteError> {
    let bytes: Vec<u8> = to_bytes(network, options)?;

    let path_ref: &Path = Path::new(path);
    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| KcdWriteError::CreateDirectory {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let file = File::create(path_ref).map_err(|source| KcdWriteError::CreateFile {
        path: path.to_string(),
        source,
    })?;
    let write_err = |source| KcdWriteError::Write {
        path: path.to_string(),
        source,
    };

    let mut writer = BufWriter::new(file);
    if options.gzip {
        let mut encoder = GzEncoder::new(&mut writer, Compression::default());
        encoder.write_all(&bytes).map_err(write_err)?;
        encoder.finish().map_err(write_err)?;
    } else {
        writer.write_all(&bytes).map_err(write_err)?;
    }
    writer.flush().map_err(write_err)?;
    Ok(())
}

fn to_bytes(network: &Network, options: &KcdOptions) -> Result<Vec<u8>, KcdWriteError> {
    let mut writer: XmlWriter = if options.pretty {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new("NetworkDefinition");
    root.push_attribute(("xmlns", KCD_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    emit(&mut writer, Event::Start(root))?;

    write_document(&mut writer, network)?;
    for node in &network.nodes {
        let mut elem = BytesStart::new("Node");
        elem.push_attribute(("id", node.id.as_str()));
        elem.push_attribute(("name", node.name.as_str()));
        emit(&mut writer, Event::Empty(elem))?;
    }
    write_bus(&mut writer, &network.bus)?;

    emit(&mut writer, Event::End(BytesEnd::new("NetworkDefinition")))?;
    Ok(writer.into_inner())
}

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), KcdWriteError> {
    writer.write_event(event).map_err(|e| KcdWriteError::Xml {
        message: e.to_string(),
    })
}

fn push_if_set(elem: &mut BytesStart<'_>, key: &str, value: &str) {
    if !value.is_empty() {
        elem.push_attribute((key, value));
    }
}

fn write_text_element(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<(), KcdWriteError> {
    emit(writer, Event::Start(BytesStart::new(tag)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

fn write_document(writer: &mut XmlWriter, network: &Network) -> Result<(), KcdWriteError> {
    let document = &network.document;
    let mut elem = BytesStart::new("Document");
    push_if_set(&mut elem, "name", &document.name);
    push_if_set(&mut elem, "version", &document.version);
    push_if_set(&mut elem, "author", &document.author);
    push_if_set(&mut elem, "company", &document.company);
    push_if_set(&mut elem, "date", &document.date);

    if document.content.is_empty() {
        return emit(writer, Event::Empty(elem));
    }
    emit(writer, Event::Start(elem))?;
    emit(writer, Event::Text(BytesText::new(&document.content)))?;
    emit(writer, Event::End(BytesEnd::new("Document")))
}

fn write_bus(writer: &mut XmlWriter, bus: &Bus) -> Result<(), KcdWriteError> {
    let mut elem = BytesStart::new("Bus");
    elem.push_attribute(("name", bus.name.as_str()));
    if let Some(baudrate) = bus.baudrate {
        elem.push_attribute(("baudrate", baudrate.to_string().as_str()));
    }

    if bus.message_count() == 0 {
        return emit(writer, Event::Empty(elem));
    }
    emit(writer, Event::Start(elem))?;
    for message in bus.iter_messages() {
        write_message(writer, message)?;
    }
    emit(writer, Event::End(BytesEnd::new("Bus")))
}

fn write_message(writer: &mut XmlWriter, message: &Message) -> Result<(), KcdWriteError> {
    let mut elem = BytesStart::new("Message");
    elem.push_attribute(("id", message.id_hex().as_str()));
    elem.push_attribute(("name", message.name.as_str()));
    elem.push_attribute(("length", message.length.to_string().as_str()));
    if let Some(interval) = message.interval {
        elem.push_attribute(("interval", interval.to_string().as_str()));
    }
    if message.is_extended() {
        elem.push_attribute(("format", message.format.as_str()));
    }
    if let Some(fd) = message.fd {
        elem.push_attribute(("fd", bool_str(fd)));
    }
    if let Some(brs) = message.bitrate_switch {
        elem.push_attribute(("bitrateswitch", bool_str(brs)));
    }

    let has_children: bool = message.notes.is_some()
        || message.producer.is_some()
        || !message.signals.is_empty()
        || !message.multiplexes.is_empty();
    if !has_children {
        return emit(writer, Event::Empty(elem));
    }

    emit(writer, Event::Start(elem))?;
    if let Some(notes) = &message.notes {
        write_text_element(writer, "Notes", notes)?;
    }
    if let Some(producer) = &message.producer {
        emit(writer, Event::Start(BytesStart::new("Producer")))?;
        write_node_ref(writer, producer)?;
        emit(writer, Event::End(BytesEnd::new("Producer")))?;
    }
    for multiplex in &message.multiplexes {
        write_multiplex(writer, multiplex)?;
    }
    for signal in &message.signals {
        write_signal(writer, "Signal", signal)?;
    }
    emit(writer, Event::End(BytesEnd::new("Message")))
}

fn write_node_ref(writer: &mut XmlWriter, id: &str) -> Result<(), KcdWriteError> {
    let mut elem = BytesStart::new("NodeRef");
    elem.push_attribute(("id", id));
    emit(writer, Event::Empty(elem))
}

fn signal_start<'a>(tag: &'a str, signal: &Signal) -> BytesStart<'a> {
    let mut elem = BytesStart::new(tag);
    elem.push_attribute(("name", signal.name.as_str()));
    elem.push_attribute(("offset", signal.offset.to_string().as_str()));
    if signal.length != 1 {
        elem.push_attribute(("length", signal.length.to_string().as_str()));
    }
    if signal.endianness == Endianness::Big {
        elem.push_attribute(("endianess", signal.endianness.as_str()));
    }
    elem
}

fn signal_has_body(signal: &Signal) -> bool {
    signal.notes.is_some()
        || !signal.consumers.is_empty()
        || signal.value.is_some()
        || signal.labels.as_ref().is_some_and(|l| !l.is_empty())
}

/// Notes, Consumer, Value and LabelSet children, in schema order.
fn write_signal_body(writer: &mut XmlWriter, signal: &Signal) -> Result<(), KcdWriteError> {
    if let Some(notes) = &signal.notes {
        write_text_element(writer, "Notes", notes)?;
    }
    if !signal.consumers.is_empty() {
        emit(writer, Event::Start(BytesStart::new("Consumer")))?;
        for consumer in &signal.consumers {
            write_node_ref(writer, consumer)?;
        }
        emit(writer, Event::End(BytesEnd::new("Consumer")))?;
    }
    if let Some(value) = &signal.value {
        write_value(writer, value)?;
    }
    if let Some(labels) = &signal.labels
        && !labels.is_empty()
    {
        write_label_set(writer, labels)?;
    }
    Ok(())
}

fn write_signal(writer: &mut XmlWriter, tag: &str, signal: &Signal) -> Result<(), KcdWriteError> {
    let elem = signal_start(tag, signal);
    if !signal_has_body(signal) {
        return emit(writer, Event::Empty(elem));
    }
    emit(writer, Event::Start(elem))?;
    write_signal_body(writer, signal)?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

fn write_multiplex(writer: &mut XmlWriter, multiplex: &Multiplex) -> Result<(), KcdWriteError> {
    emit(
        writer,
        Event::Start(signal_start("Multiplex", &multiplex.signal)),
    )?;
    write_signal_body(writer, &multiplex.signal)?;
    for group in &multiplex.groups {
        let mut elem = BytesStart::new("MuxGroup");
        elem.push_attribute(("count", group.count.to_string().as_str()));
        if group.signals.is_empty() {
            emit(writer, Event::Empty(elem))?;
            continue;
        }
        emit(writer, Event::Start(elem))?;
        for signal in &group.signals {
            write_signal(writer, "Signal", signal)?;
        }
        emit(writer, Event::End(BytesEnd::new("MuxGroup")))?;
    }
    emit(writer, Event::End(BytesEnd::new("Multiplex")))
}

fn write_value(writer: &mut XmlWriter, value: &Value) -> Result<(), KcdWriteError> {
    let mut elem = BytesStart::new("Value");
    if value.value_type != ValueType::Unsigned {
        elem.push_attribute(("type", value.value_type.as_str()));
    }
    if let Some(slope) = value.slope {
        elem.push_attribute(("slope", slope.to_string().as_str()));
    }
    if let Some(intercept) = value.intercept {
        elem.push_attribute(("intercept", intercept.to_string().as_str()));
    }
    if let Some(unit) = &value.unit {
        elem.push_attribute(("unit", unit.as_str()));
    }
    if let Some(min) = value.min {
        elem.push_attribute(("min", min.to_string().as_str()));
    }
    if let Some(max) = value.max {
        elem.push_attribute(("max", max.to_string().as_str()));
    }
    emit(writer, Event::Empty(elem))
}

fn write_label_set(writer: &mut XmlWriter, labels: &LabelSet) -> Result<(), KcdWriteError> {
    emit(writer, Event::Start(BytesStart::new("LabelSet")))?;
    for label in labels.iter() {
        let mut elem = BytesStart::new("Label");
        elem.push_attribute(("name", label.name.as_str()));
        elem.push_attribute(("value", label.value.to_string().as_str()));
        emit(writer, Event::Empty(elem))?;
    }
    emit(writer, Event::End(BytesEnd::new("LabelSet")))
}

fn bool_str(flag: bool) -> &'static str {
    if flag { "true" } else { "false" }
}
