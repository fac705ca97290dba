//! The recursive renderer.
//!
//! One [`Renderer`] is one render session: it owns the label registry built
//! from the scan of all arguments, the current depth and the pending label.
//! Every reference-bearing value passes through [`Renderer::gate`], which
//! decides between printing the full body and printing a bare label.
//!
//! ```text
//! Start -> GateCheck -> EmitLabelOnly
//!                    -> EmitFullBody -> RecurseChildren* -> Close
//! ```

mod scalar;

use std::collections::HashSet;
use std::io::{self, Write};

use chrono::{Datelike, Timelike, Utc};

use crate::error::{DumpError, DumpResult};
use crate::identity::{identity_of, Identity};
use crate::labels::{Label, LabelRegistry};
use crate::options::Options;
use crate::scan::{scan, scan_quiet, ReusedSet};
use crate::type_name::TypeNamer;
use crate::value::{Custom, Field, Func, Record, Ref, Value};

/// Render `values` to `w`, separated by `options.separator`.
///
/// All arguments share one scan, so a value shared between two arguments is
/// printed in full once and referred to by its label afterwards.
pub fn render(values: &[Value], options: &Options, w: &mut dyn io::Write) -> DumpResult<()> {
    let reused = scan(values);
    tracing::debug!(
        arguments = values.len(),
        reused = reused.len(),
        compact = options.compact,
        "rendering dump"
    );

    let mut renderer = Renderer::new(w, options, reused, HashSet::new())?;
    renderer.render_all(values)?;
    tracing::debug!(labels = renderer.labels.assigned(), "dump rendered");
    Ok(())
}

struct Renderer<'a> {
    w: &'a mut dyn io::Write,
    options: &'a Options,
    namer: TypeNamer,
    labels: LabelRegistry,
    depth: usize,
    /// Label waiting for the next line end.
    pending: Option<Label>,
    /// Identities whose body is being rendered right now.
    in_progress: HashSet<Identity>,
    /// Identities still open in the sessions that started this one.
    outer: HashSet<Identity>,
}

impl<'a> Renderer<'a> {
    fn new(
        w: &'a mut dyn io::Write,
        options: &'a Options,
        reused: ReusedSet,
        outer: HashSet<Identity>,
    ) -> DumpResult<Self> {
        Ok(Self {
            w,
            options,
            namer: TypeNamer::new(options)?,
            labels: LabelRegistry::new(reused),
            depth: 0,
            pending: None,
            in_progress: HashSet::new(),
            outer,
        })
    }

    fn render_all(&mut self, values: &[Value]) -> DumpResult<()> {
        let options = self.options;
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.write_str(&options.separator)?;
            }
            self.render_value(value)?;
            self.flush_pending()?;
        }
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> DumpResult<()> {
        self.w.write_all(s.as_bytes())?;
        Ok(())
    }

    fn indent(&mut self) -> DumpResult<()> {
        if !self.options.compact {
            for _ in 0..self.depth {
                self.w.write_all(b"  ")?;
            }
        }
        Ok(())
    }

    /// End the current line, attaching the pending label if there is one.
    ///
    /// In compact mode there are no line ends; only the label is written.
    fn newline_with_label(&mut self) -> DumpResult<()> {
        if let Some(label) = self.pending.take() {
            if self.options.compact {
                write!(self.w, "/*{}*/", label)?;
            } else {
                writeln!(self.w, " // {}", label)?;
            }
            return Ok(());
        }
        if !self.options.compact {
            self.w.write_all(b"\n")?;
        }
        Ok(())
    }

    /// A label that is still waiting is written inline before it is replaced.
    fn set_pending(&mut self, label: Label) -> DumpResult<()> {
        if let Some(previous) = self.pending.replace(label) {
            write!(self.w, "/*{}*/", previous)?;
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> DumpResult<()> {
        if let Some(label) = self.pending.take() {
            write!(self.w, "/*{}*/", label)?;
        }
        Ok(())
    }

    fn write_type(&mut self, raw: &str) -> DumpResult<()> {
        let name = self.namer.name(raw);
        self.w.write_all(name.as_bytes())?;
        Ok(())
    }

    /// Render `body` in full or replace it with a label.
    fn gate<F>(&mut self, value: &Value, body: F) -> DumpResult<()>
    where
        F: FnOnce(&mut Self) -> DumpResult<()>,
    {
        let id = match identity_of(value) {
            Some(id) => id,
            None => return body(self),
        };

        // Only key text sessions have outer identities. Their output is
        // never printed, so a stand-in is enough to end the descent.
        if self.outer.contains(&id) {
            return self.write_str("...");
        }

        // Re-entering an identity from inside its own body is a cycle, which
        // always collapses to the label.
        let entered = self.in_progress.insert(id);
        let replace = !(self.options.disable_pointer_replacement && entered);

        let result = match self.labels.label_for(id) {
            None => body(self),
            Some((label, first_visit)) if first_visit || !replace => {
                self.set_pending(label)?;
                body(self)
            }
            Some((label, _)) => self.write_str(&label.to_string()),
        };

        if entered {
            self.in_progress.remove(&id);
        }
        result
    }

    fn render_value(&mut self, value: &Value) -> DumpResult<()> {
        let mut value = value;
        while let Value::Dyn(Some(inner)) = value {
            value = inner;
        }

        match value {
            Value::Dyn(None) => return self.write_str("nil"),
            Value::Ref(Ref { target: None, .. }) => return self.write_str("nil"),
            _ => {}
        }

        let options = self.options;
        if let Some(hook) = &options.dump_func {
            let mut buf = Vec::new();
            let sink: &mut dyn io::Write = &mut buf;
            if hook(value, sink) {
                return self.render_captured(&value.type_name(), &buf);
            }
        }

        match value {
            Value::Bool(b) => self.write_str(if *b { "true" } else { "false" }),
            Value::Int(n) => self.write_str(&n.to_string()),
            Value::Uint(n) => self.write_str(&n.to_string()),
            Value::F32(x) => self.write_str(&scalar::float32(*x)),
            Value::F64(x) => self.write_str(&scalar::float64(*x)),
            Value::Complex64(re, im) => {
                self.write_str(&scalar::complex(64, &scalar::float32(*re), &scalar::float32(*im)))
            }
            Value::Complex128(re, im) => {
                self.write_str(&scalar::complex(128, &scalar::float64(*re), &scalar::float64(*im)))
            }
            Value::Str(s) => self.write_str(&scalar::quote(s)),
            Value::List(list) => match list.items.as_deref() {
                None => self.write_str("nil"),
                Some(items) => {
                    self.gate(value, |r| r.render_sequence(&list.type_name, items))
                }
            },
            Value::Array(array) => self.render_sequence(&array.type_name, &array.items),
            Value::Map(map) => match map.entries.as_deref() {
                None => {
                    self.write_type(&map.type_name)?;
                    self.write_str("(nil)")
                }
                Some(entries) => self.gate(value, |r| r.render_map(&map.type_name, entries)),
            },
            Value::Record(record) => self.render_record(record),
            Value::Ref(r) => self.gate(value, |renderer| renderer.render_ref(r)),
            Value::Dyn(_) => Ok(()),
            Value::Func(func) => self.render_func(func),
            Value::Chan(chan) => self.write_str(&chan.type_name),
            Value::Custom(custom) => self.gate(value, |r| r.render_custom(custom)),
            Value::Time(t) => self.render_time(t),
            Value::Opaque(opaque) => self.write_str(&opaque.text),
        }
    }

    fn render_sequence(&mut self, type_name: &str, items: &[Value]) -> DumpResult<()> {
        self.write_type(type_name)?;
        if items.is_empty() {
            return self.write_str("{}");
        }

        self.write_str("{")?;
        self.newline_with_label()?;
        self.depth += 1;
        for (i, item) in items.iter().enumerate() {
            self.indent()?;
            self.render_value(item)?;
            if !self.options.compact || i + 1 < items.len() {
                self.write_str(",")?;
            }
            self.newline_with_label()?;
        }
        self.depth -= 1;
        self.indent()?;
        self.write_str("}")
    }

    fn render_map(&mut self, type_name: &str, entries: &[(Value, Value)]) -> DumpResult<()> {
        self.write_type(type_name)?;
        if entries.is_empty() {
            return self.write_str("{}");
        }

        // Each key is rendered once, alone, in a session of its own.
        let mut sorted = Vec::with_capacity(entries.len());
        if entries.len() > 1 {
            for entry in entries {
                sorted.push((self.key_text(&entry.0)?, entry));
            }
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
        } else {
            sorted.extend(entries.iter().map(|entry| (String::new(), entry)));
        }

        self.write_str("{")?;
        self.newline_with_label()?;
        self.depth += 1;
        let separator = if self.options.compact { ":" } else { ": " };
        for (i, (_, (key, value))) in sorted.iter().enumerate() {
            self.indent()?;
            self.render_value(key)?;
            self.write_str(separator)?;
            self.render_value(value)?;
            if !self.options.compact || i + 1 < sorted.len() {
                self.write_str(",")?;
            }
            self.newline_with_label()?;
        }
        self.depth -= 1;
        self.indent()?;
        self.write_str("}")
    }

    fn key_text(&self, key: &Value) -> DumpResult<String> {
        let keys = std::slice::from_ref(key);
        let outer = self.outer.union(&self.in_progress).copied().collect();

        let mut buf = Vec::new();
        Renderer::new(&mut buf, self.options, scan_quiet(keys), outer)?.render_all(keys)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn render_record(&mut self, record: &Record) -> DumpResult<()> {
        let options = self.options;
        let visible: Vec<&Field> = record
            .fields
            .iter()
            .filter(|field| options.shows_field(field))
            .collect();

        self.write_type(&record.type_name)?;
        if visible.is_empty() {
            return self.write_str("{}");
        }

        self.write_str("{")?;
        self.newline_with_label()?;
        self.depth += 1;
        let separator = if options.compact { ":" } else { ": " };
        for (i, field) in visible.iter().enumerate() {
            self.indent()?;
            self.write_str(&field.name)?;
            self.write_str(separator)?;
            self.render_value(&field.value)?;
            if !options.compact || i + 1 < visible.len() {
                self.write_str(",")?;
            }
            self.newline_with_label()?;
        }
        self.depth -= 1;
        self.indent()?;
        self.write_str("}")
    }

    fn render_ref(&mut self, r: &Ref) -> DumpResult<()> {
        let cell = match &r.target {
            Some(cell) => cell,
            None => return self.write_str("nil"),
        };
        let target = match cell.try_borrow() {
            Ok(target) => target,
            Err(_) => return self.write_str("&<borrowed>"),
        };

        if self.options.strict_go {
            let elem = self.namer.name(&r.elem_type).into_owned();
            write!(self.w, "(func(v {0}) *{0} {{ return &v }})(", elem)?;
            self.render_value(&target)?;
            self.write_str(")")
        } else {
            self.write_str("&")?;
            self.render_value(&target)
        }
    }

    fn render_func(&mut self, func: &Func) -> DumpResult<()> {
        if func.is_closure() {
            return self.write_type(&func.signature);
        }
        let name = func.path.rsplit('/').next().unwrap_or(&func.path);
        self.write_type(name)
    }

    fn render_custom(&mut self, custom: &Custom) -> DumpResult<()> {
        let mut buf = Vec::new();
        custom
            .dumper
            .dump(&mut buf)
            .map_err(|source| DumpError::Hook {
                type_name: custom.type_name.clone(),
                source,
            })?;
        self.render_captured(&custom.type_name, &buf)
    }

    /// Print a hook's captured output behind the value's type name.
    ///
    /// Lines after the first are indented to the current depth; the pending
    /// label attaches to the first line end.
    fn render_captured(&mut self, type_name: &str, captured: &[u8]) -> DumpResult<()> {
        let text = std::str::from_utf8(captured).map_err(|_| DumpError::MalformedCapture {
            type_name: type_name.to_string(),
        })?;

        self.write_type(type_name)?;
        if self.options.compact {
            return self.write_str(text);
        }

        let text = text.strip_suffix('\n').unwrap_or(text);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.newline_with_label()?;
                self.indent()?;
            }
            self.write_str(line.trim_end_matches(' '))?;
        }
        Ok(())
    }

    fn render_time(&mut self, t: &chrono::DateTime<chrono::FixedOffset>) -> DumpResult<()> {
        if self.options.format_time {
            let t = t.with_timezone(&Utc);
            write!(
                self.w,
                "time.Date({}, {}, {}, {}, {}, {}, {}, time.UTC)",
                t.year(),
                t.month(),
                t.day(),
                t.hour(),
                t.minute(),
                t.second(),
                t.nanosecond(),
            )?;
            return Ok(());
        }

        let record = Record {
            type_name: "time.Time".to_string(),
            fields: vec![
                Field::private("wall", Value::Int(t.timestamp())),
                Field::private("nsec", Value::Int(i64::from(t.timestamp_subsec_nanos()))),
            ],
        };
        self.render_record(&record)
    }
}

impl Options {
    /// Render `values` into `w`.
    ///
    /// This is the only entry point that reports failures instead of
    /// panicking on them.
    pub fn fdump(&self, w: &mut dyn io::Write, values: &[Value]) -> DumpResult<()> {
        render(values, self, w)
    }

    /// Render `values` into a string.
    ///
    /// # Panics
    ///
    /// When a custom hook fails or produces invalid UTF-8.
    pub fn sdump(&self, values: &[Value]) -> String {
        let mut buf = Vec::new();
        if let Err(err) = self.fdump(&mut buf, values) {
            fatal(err);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Render `values` to stdout, followed by a newline.
    ///
    /// # Panics
    ///
    /// When stdout cannot be written or a custom hook fails.
    pub fn dump(&self, values: &[Value]) {
        let stdout = io::stdout();
        if let Err(err) = self.dump_line(&mut stdout.lock(), values) {
            fatal(err);
        }
    }

    fn dump_line<W: io::Write>(&self, w: &mut W, values: &[Value]) -> DumpResult<()> {
        self.fdump(w, values)?;
        w.write_all(b"\n")?;
        Ok(())
    }
}

fn fatal(err: DumpError) -> ! {
    tracing::error!(error = %err, "dump failed");
    panic!("graphdump: {}", err)
}
