// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Excel output as an XML Spreadsheet 2003 (SpreadsheetML) workbook with a
//! single worksheet. Excel and LibreOffice open these directly.

use crate::error::CodecError;
use crate::frame::Cell;
use crate::frame::Frame;
use quick_xml::Writer;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

fn write_cell<W: Write>(writer: &mut Writer<W>, kind: &str, text: &str) -> Result<(), quick_xml::Error> {
  writer.write_event(Event::Start(BytesStart::new("Cell")))?;
  writer.write_event(Event::Start(
    BytesStart::new("Data").with_attributes([("ss:Type", kind)]),
  ))?;
  writer.write_event(Event::Text(BytesText::new(text)))?;
  writer.write_event(Event::End(BytesEnd::new("Data")))?;
  writer.write_event(Event::End(BytesEnd::new("Cell")))
}

fn write_value<W: Write>(writer: &mut Writer<W>, cell: Cell<'_>) -> Result<(), quick_xml::Error> {
  match cell {
    Cell::Bool(v) => write_cell(writer, "Boolean", if v { "1" } else { "0" }),
    Cell::Int(v) => write_cell(writer, "Number", &v.to_string()),
    Cell::Float32(v) if v.is_finite() => write_cell(writer, "Number", &v.to_string()),
    Cell::Float64(v) if v.is_finite() => write_cell(writer, "Number", &v.to_string()),
    other => write_cell(writer, "String", &other.to_string()),
  }
}

pub fn write_excel(frame: &Frame, path: &Path, sheet_name: &str) -> Result<(), CodecError> {
  let mut writer = Writer::new(BufWriter::new(File::create(path)?));

  writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
  writer.write_event(Event::Start(
    BytesStart::new("Workbook").with_attributes([("xmlns", SPREADSHEET_NS), ("xmlns:ss", SPREADSHEET_NS)]),
  ))?;
  writer.write_event(Event::Start(
    BytesStart::new("Worksheet").with_attributes([("ss:Name", sheet_name)]),
  ))?;
  writer.write_event(Event::Start(BytesStart::new("Table")))?;

  writer.write_event(Event::Start(BytesStart::new("Row")))?;
  for name in frame.column_names() {
    write_cell(&mut writer, "String", name)?;
  }
  writer.write_event(Event::End(BytesEnd::new("Row")))?;

  for row in 0..frame.num_rows() {
    writer.write_event(Event::Start(BytesStart::new("Row")))?;
    for column in frame.columns() {
      write_value(&mut writer, column.data.cell(row))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Row")))?;
  }

  writer.write_event(Event::End(BytesEnd::new("Table")))?;
  writer.write_event(Event::End(BytesEnd::new("Worksheet")))?;
  writer.write_event(Event::End(BytesEnd::new("Workbook")))?;

  writer.into_inner().flush()?;
  Ok(())
}
