//! Built-in operations callable by name.
//!
//! Every public operation of the runtime classes is registered here as
//! `"Class.Operation"`, so a scripting host that can only pass primitive
//! values can drive a [`Runtime`]. Properties appear as `Get<Name>` and
//! `Set<Name>` pairs.
//!
//! All operations follow a consistent pattern:
//! - Take the runtime and a slice of `Value` arguments
//! - Return `RuntimeResult<Value>`
//! - Arity is checked by [`call`] before the operation runs
//! - Operations with nothing to return yield `Value::Bool(true)`
//!
//! Event handler registration (`Timer.Tick`, `GraphicsWindow.KeyDown`, ...)
//! takes Rust closures and is only available on the runtime types.

use std::collections::HashMap;
use std::sync::LazyLock;

use smallbasic_runtime::error::{RuntimeError, RuntimeResult};
use smallbasic_runtime::graphics_window::GraphicsWindow;
use smallbasic_runtime::surface::Point;
use smallbasic_runtime::text_window::ConsoleColor;
use smallbasic_runtime::{Runtime, Value, clock, file, math, text};

pub type BuiltinFn = fn(&Runtime, &[Value]) -> RuntimeResult<Value>;

/// A named operation and the number of arguments it takes
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub func: BuiltinFn,
}

fn done() -> RuntimeResult<Value> {
    Ok(Value::Bool(true))
}

fn text_arg(args: &[Value], index: usize) -> String {
    args[index].to_text()
}

fn number(args: &[Value], index: usize) -> RuntimeResult<f64> {
    args[index].to_number()
}

fn integer(args: &[Value], index: usize) -> RuntimeResult<i64> {
    args[index].to_int()
}

fn ranged<T: TryFrom<i64>>(args: &[Value], index: usize) -> RuntimeResult<T> {
    let n = integer(args, index)?;
    T::try_from(n).map_err(|_| RuntimeError::invalid_argument(format!("{n} is out of range")))
}

fn point(args: &[Value], index: usize) -> RuntimeResult<Point> {
    Ok((number(args, index)?, number(args, index + 1)?))
}

fn triangle(args: &[Value]) -> RuntimeResult<[Point; 3]> {
    Ok([point(args, 0)?, point(args, 2)?, point(args, 4)?])
}

fn console_color(args: &[Value], index: usize) -> RuntimeResult<ConsoleColor> {
    text_arg(args, index).parse()
}

/// Reads a line from a file.
///
/// # Arguments
/// * `args` - The file path and a 1-based line number.
///
/// # Returns
/// The line's text without its line ending.
///
/// # Errors
/// * `NotFound` if the file does not exist.
/// * `InvalidArgument` if the line number is past the end of the file.
///
/// # Example
/// ```text
/// File.ReadLine("notes.txt", 1)  ' first line of notes.txt
/// ```
fn file_read_line(_: &Runtime, args: &[Value]) -> RuntimeResult<Value> {
    Ok(file::read_line(text_arg(args, 0), integer(args, 1)?)?.into())
}

/// Inserts a line before the given line of a file.
///
/// # Arguments
/// * `args` - The file path, a 1-based line number and the text to insert.
///   The line number may be one past the last line, which appends.
///
/// # Errors
/// * `InvalidArgument` if the line number is out of range; the file is left
///   untouched.
fn file_insert_line(_: &Runtime, args: &[Value]) -> RuntimeResult<Value> {
    file::insert_line(text_arg(args, 0), integer(args, 1)?, &text_arg(args, 2))?;
    done()
}

/// Removes and returns the most recently pushed value of a named stack.
///
/// # Errors
/// * `NotFound` if nothing was ever pushed under that name.
/// * `Empty` if the stack exists but holds no values.
///
/// # Example
/// ```text
/// Stack.PushValue("s", 1)
/// Stack.PopValue("s")  ' returns 1
/// ```
fn stack_pop_value(rt: &Runtime, args: &[Value]) -> RuntimeResult<Value> {
    rt.stack.take(&text_arg(args, 0))
}

/// Removes and returns the oldest value of a named queue.
///
/// # Errors
/// * `NotFound` if nothing was ever enqueued under that name.
/// * `Empty` if the queue exists but holds no values.
fn queue_dequeue_value(rt: &Runtime, args: &[Value]) -> RuntimeResult<Value> {
    rt.queue.take(&text_arg(args, 0))
}

/// Loads an image from a file path or an `http(s)` URL.
///
/// # Returns
/// The generated image name (`Image0`, `Image1`, ...).
///
/// # Errors
/// * `NotFound` or `Io` if a local file cannot be read.
/// * `Network` if a download fails.
/// * `Image` if the data is not a valid PNG image.
fn image_list_load_image(rt: &Runtime, args: &[Value]) -> RuntimeResult<Value> {
    Ok(rt.images.load_image(&text_arg(args, 0))?.into_string().into())
}

/// Moves a shape to a new position over time.
///
/// # Arguments
/// * `args` - The shape name, target left and top, and the duration in
///   milliseconds. A duration of 0 moves the shape at once.
///
/// The call returns immediately; the movement continues in the background.
fn shapes_animate(rt: &Runtime, args: &[Value]) -> RuntimeResult<Value> {
    let duration = ranged::<u64>(args, 3)?;
    rt.shapes
        .animate(&text_arg(args, 0), number(args, 1)?, number(args, 2)?, duration)?;
    done()
}

/// Sleeps for up to the given number of seconds.
///
/// # Returns
/// `True` if a key press cut the sleep short. The key is consumed.
fn program_sleep(rt: &Runtime, args: &[Value]) -> RuntimeResult<Value> {
    Ok(rt.program.sleep(number(args, 0)?)?.into())
}

/// Reads lines from the text window until one is a number.
///
/// Every rejected line prints "Invalid number, please try again.".
///
/// # Errors
/// * `Io` if the input ends before a number was read.
fn text_window_read_number(rt: &Runtime, _args: &[Value]) -> RuntimeResult<Value> {
    Ok(rt.text_window.read_number()?.into())
}

fn builtin(name: &'static str, arity: usize, func: BuiltinFn) -> Builtin {
    Builtin { name, arity, func }
}

/// Registry of every operation callable through [`call`].
///
/// # Available Classes
///
/// ## Pure helpers
/// - `Clock`, `Math`, `Text`, `File`, `Network`
///
/// ## Named stores
/// - `Stack`, `Queue`, `ImageList`
///
/// ## Windows
/// - `GraphicsWindow`, `Shapes`, `Controls`, `TextWindow`
///
/// ## Host services
/// - `Program`, `Mouse`, `Desktop`, `Sound`, `Timer`
pub static BUILTINS: LazyLock<HashMap<&'static str, Builtin>> = LazyLock::new(|| {
    let temp = [
        // Clock
        builtin("Clock.GetTime", 0, |_, _| Ok(clock::time().into())),
        builtin("Clock.GetDate", 0, |_, _| Ok(clock::date().into())),
        builtin("Clock.GetYear", 0, |_, _| Ok(clock::year().into())),
        builtin("Clock.GetMonth", 0, |_, _| Ok(clock::month().into())),
        builtin("Clock.GetDay", 0, |_, _| Ok(clock::day().into())),
        builtin("Clock.GetWeekDay", 0, |_, _| Ok(clock::week_day().into())),
        builtin("Clock.GetHour", 0, |_, _| Ok(clock::hour().into())),
        builtin("Clock.GetMinute", 0, |_, _| Ok(clock::minute().into())),
        builtin("Clock.GetSecond", 0, |_, _| Ok(clock::second().into())),
        builtin("Clock.GetMillisecond", 0, |_, _| Ok(clock::millisecond().into())),
        builtin("Clock.GetElapsedMilliseconds", 0, |_, _| {
            Ok(clock::elapsed_milliseconds().into())
        }),
        // Math
        builtin("Math.GetPi", 0, |_, _| Ok(math::PI.into())),
        builtin("Math.Abs", 1, |_, a| Ok(math::abs(number(a, 0)?).into())),
        builtin("Math.Ceiling", 1, |_, a| Ok(math::ceiling(number(a, 0)?).into())),
        builtin("Math.Floor", 1, |_, a| Ok(math::floor(number(a, 0)?).into())),
        builtin("Math.Round", 1, |_, a| Ok(math::round(number(a, 0)?).into())),
        builtin("Math.NaturalLog", 1, |_, a| Ok(math::natural_log(number(a, 0)?).into())),
        builtin("Math.Log", 1, |_, a| Ok(math::log(number(a, 0)?).into())),
        builtin("Math.Cos", 1, |_, a| Ok(math::cos(number(a, 0)?).into())),
        builtin("Math.Sin", 1, |_, a| Ok(math::sin(number(a, 0)?).into())),
        builtin("Math.Tan", 1, |_, a| Ok(math::tan(number(a, 0)?).into())),
        builtin("Math.ArcSin", 1, |_, a| Ok(math::arc_sin(number(a, 0)?).into())),
        builtin("Math.ArcCos", 1, |_, a| Ok(math::arc_cos(number(a, 0)?).into())),
        builtin("Math.ArcTan", 1, |_, a| Ok(math::arc_tan(number(a, 0)?).into())),
        builtin("Math.GetDegrees", 1, |_, a| Ok(math::get_degrees(number(a, 0)?).into())),
        builtin("Math.GetRadians", 1, |_, a| Ok(math::get_radians(number(a, 0)?).into())),
        builtin("Math.SquareRoot", 1, |_, a| Ok(math::square_root(number(a, 0)?).into())),
        builtin("Math.Power", 2, |_, a| {
            Ok(math::power(number(a, 0)?, number(a, 1)?).into())
        }),
        builtin("Math.Max", 2, |_, a| Ok(math::max(number(a, 0)?, number(a, 1)?).into())),
        builtin("Math.Min", 2, |_, a| Ok(math::min(number(a, 0)?, number(a, 1)?).into())),
        builtin("Math.Remainder", 2, |_, a| {
            Ok(math::remainder(number(a, 0)?, number(a, 1)?).into())
        }),
        builtin("Math.GetRandomNumber", 1, |_, a| {
            Ok(math::get_random_number(integer(a, 0)?)?.into())
        }),
        builtin("Math.GetRandomBoolean", 0, |_, _| Ok(math::get_random_boolean().into())),
        builtin("Math.GetRandomString", 1, |_, a| {
            Ok(math::get_random_string(integer(a, 0)?)?.into())
        }),
        // Text
        builtin("Text.Append", 2, |_, a| {
            Ok(text::append(&text_arg(a, 0), &text_arg(a, 1)).into())
        }),
        builtin("Text.GetLength", 1, |_, a| Ok(text::get_length(&text_arg(a, 0)).into())),
        builtin("Text.IsSubText", 2, |_, a| {
            Ok(text::is_sub_text(&text_arg(a, 0), &text_arg(a, 1)).into())
        }),
        builtin("Text.EndsWith", 2, |_, a| {
            Ok(text::ends_with(&text_arg(a, 0), &text_arg(a, 1)).into())
        }),
        builtin("Text.StartsWith", 2, |_, a| {
            Ok(text::starts_with(&text_arg(a, 0), &text_arg(a, 1)).into())
        }),
        builtin("Text.GetSubText", 3, |_, a| {
            Ok(text::get_sub_text(&text_arg(a, 0), integer(a, 1)?, integer(a, 2)?)?.into())
        }),
        builtin("Text.GetSubTextToEnd", 2, |_, a| {
            Ok(text::get_sub_text_to_end(&text_arg(a, 0), integer(a, 1)?)?.into())
        }),
        builtin("Text.GetIndexOf", 2, |_, a| {
            Ok(text::get_index_of(&text_arg(a, 0), &text_arg(a, 1)).into())
        }),
        builtin("Text.ConvertToLowerCase", 1, |_, a| {
            Ok(text::convert_to_lower_case(&text_arg(a, 0)).into())
        }),
        builtin("Text.ConvertToUpperCase", 1, |_, a| {
            Ok(text::convert_to_upper_case(&text_arg(a, 0)).into())
        }),
        builtin("Text.GetCharacter", 1, |_, a| {
            Ok(text::get_character(integer(a, 0)?)?.into())
        }),
        builtin("Text.GetCharacterCode", 1, |_, a| {
            Ok(text::get_character_code(&text_arg(a, 0))?.into())
        }),
        // File
        builtin("File.ReadContents", 1, |_, a| {
            Ok(file::read_contents(text_arg(a, 0))?.into())
        }),
        builtin("File.WriteContents", 2, |_, a| {
            file::write_contents(text_arg(a, 0), &text_arg(a, 1))?;
            done()
        }),
        builtin("File.ReadLine", 2, file_read_line),
        builtin("File.WriteLine", 3, |_, a| {
            file::write_line(text_arg(a, 0), integer(a, 1)?, &text_arg(a, 2))?;
            done()
        }),
        builtin("File.InsertLine", 3, file_insert_line),
        builtin("File.AppendContents", 2, |_, a| {
            file::append_contents(text_arg(a, 0), &text_arg(a, 1))?;
            done()
        }),
        builtin("File.CopyFile", 2, |_, a| {
            file::copy_file(text_arg(a, 0), text_arg(a, 1))?;
            done()
        }),
        builtin("File.DeleteFile", 1, |_, a| {
            file::delete_file(text_arg(a, 0))?;
            done()
        }),
        builtin("File.CreateDirectory", 1, |_, a| {
            Ok(file::create_directory(text_arg(a, 0))?.into())
        }),
        builtin("File.DeleteDirectory", 1, |_, a| {
            file::delete_directory(text_arg(a, 0))?;
            done()
        }),
        builtin("File.GetFiles", 1, |_, a| Ok(file::get_files(text_arg(a, 0))?.into())),
        builtin("File.GetDirectories", 1, |_, a| {
            Ok(file::get_directories(text_arg(a, 0))?.into())
        }),
        // Stack
        builtin("Stack.PushValue", 2, |rt, a| {
            rt.stack.push(&text_arg(a, 0), a[1].clone());
            done()
        }),
        builtin("Stack.PopValue", 1, stack_pop_value),
        builtin("Stack.PeekValue", 1, |rt, a| rt.stack.peek(&text_arg(a, 0))),
        builtin("Stack.GetCount", 1, |rt, a| Ok(rt.stack.count(&text_arg(a, 0))?.into())),
        builtin("Stack.Remove", 1, |rt, a| Ok(rt.stack.remove(&text_arg(a, 0)).into())),
        // Queue
        builtin("Queue.EnqueueValue", 2, |rt, a| {
            rt.queue.push(&text_arg(a, 0), a[1].clone());
            done()
        }),
        builtin("Queue.DequeueValue", 1, queue_dequeue_value),
        builtin("Queue.PeekValue", 1, |rt, a| rt.queue.peek(&text_arg(a, 0))),
        builtin("Queue.GetCount", 1, |rt, a| Ok(rt.queue.count(&text_arg(a, 0))?.into())),
        builtin("Queue.Remove", 1, |rt, a| Ok(rt.queue.remove(&text_arg(a, 0)).into())),
        // Network
        builtin("Network.GetWebPageContents", 1, |rt, a| {
            Ok(rt.network.get_web_page_contents(&text_arg(a, 0))?.into())
        }),
        builtin("Network.DownloadFile", 2, |rt, a| {
            let path = rt.network.download_file(text_arg(a, 0), &text_arg(a, 1))?;
            Ok(path.display().to_string().into())
        }),
        // Program
        builtin("Program.GetArgumentCount", 0, |rt, _| {
            Ok(rt.program.argument_count().into())
        }),
        builtin("Program.GetArgument", 1, |rt, a| {
            Ok(rt.program.get_argument(integer(a, 0)?)?.into())
        }),
        builtin("Program.GetDirectory", 0, |rt, _| {
            Ok(rt.program.directory()?.display().to_string().into())
        }),
        builtin("Program.Delay", 1, |rt, a| {
            rt.program.delay(ranged(a, 0)?);
            done()
        }),
        builtin("Program.Sleep", 1, program_sleep),
        builtin("Program.End", 0, |rt, _| rt.program.end()),
        // Mouse
        builtin("Mouse.GetMouseX", 0, |rt, _| Ok(rt.mouse.mouse_x().into())),
        builtin("Mouse.SetMouseX", 1, |rt, a| {
            rt.mouse.set_mouse_x(ranged::<i32>(a, 0)?);
            done()
        }),
        builtin("Mouse.GetMouseY", 0, |rt, _| Ok(rt.mouse.mouse_y().into())),
        builtin("Mouse.SetMouseY", 1, |rt, a| {
            rt.mouse.set_mouse_y(ranged::<i32>(a, 0)?);
            done()
        }),
        builtin("Mouse.IsLeftButtonDown", 0, |rt, _| {
            Ok(rt.mouse.is_left_button_down().into())
        }),
        builtin("Mouse.IsRightButtonDown", 0, |rt, _| {
            Ok(rt.mouse.is_right_button_down().into())
        }),
        builtin("Mouse.HideCursor", 0, |rt, _| {
            rt.mouse.hide_cursor();
            done()
        }),
        builtin("Mouse.ShowCursor", 0, |rt, _| {
            rt.mouse.show_cursor();
            done()
        }),
        // Desktop
        builtin("Desktop.GetWidth", 0, |rt, _| Ok(rt.desktop.width().into())),
        builtin("Desktop.GetHeight", 0, |rt, _| Ok(rt.desktop.height().into())),
        builtin("Desktop.SetWallPaper", 1, |rt, a| {
            rt.desktop.set_wallpaper(&text_arg(a, 0))?;
            done()
        }),
        // Sound
        builtin("Sound.PlayClick", 0, |rt, _| rt.sound.play_click().and_then(|_| done())),
        builtin("Sound.PlayClickAndWait", 0, |rt, _| {
            rt.sound.play_click_and_wait().and_then(|_| done())
        }),
        builtin("Sound.PlayChime", 0, |rt, _| rt.sound.play_chime().and_then(|_| done())),
        builtin("Sound.PlayChimeAndWait", 0, |rt, _| {
            rt.sound.play_chime_and_wait().and_then(|_| done())
        }),
        builtin("Sound.PlayChimes", 0, |rt, _| rt.sound.play_chimes().and_then(|_| done())),
        builtin("Sound.PlayChimesAndWait", 0, |rt, _| {
            rt.sound.play_chimes_and_wait().and_then(|_| done())
        }),
        builtin("Sound.PlayBellRing", 0, |rt, _| {
            rt.sound.play_bell_ring().and_then(|_| done())
        }),
        builtin("Sound.PlayBellRingAndWait", 0, |rt, _| {
            rt.sound.play_bell_ring_and_wait().and_then(|_| done())
        }),
        builtin("Sound.Play", 1, |rt, a| rt.sound.play(&text_arg(a, 0)).and_then(|_| done())),
        builtin("Sound.PlayAndWait", 1, |rt, a| {
            rt.sound.play_and_wait(&text_arg(a, 0)).and_then(|_| done())
        }),
        builtin("Sound.Stop", 0, |rt, _| rt.sound.stop().and_then(|_| done())),
        builtin("Sound.Pause", 0, |rt, _| rt.sound.pause().and_then(|_| done())),
        builtin("Sound.IsPlaying", 0, |rt, _| Ok(rt.sound.is_playing().into())),
        // Timer
        builtin("Timer.GetInterval", 0, |rt, _| Ok((rt.timer.interval() as f64).into())),
        builtin("Timer.SetInterval", 1, |rt, a| {
            rt.timer.set_interval(integer(a, 0)?)?;
            done()
        }),
        builtin("Timer.Resume", 0, |rt, _| {
            rt.timer.resume();
            done()
        }),
        builtin("Timer.Pause", 0, |rt, _| {
            rt.timer.pause();
            done()
        }),
        builtin("Timer.Stop", 0, |rt, _| {
            rt.timer.stop();
            done()
        }),
        builtin("Timer.ExecuteOnce", 0, |rt, _| {
            rt.timer.execute_once();
            done()
        }),
        builtin("Timer.GetState", 0, |rt, _| Ok(format!("{:?}", rt.timer.state()).into())),
        builtin("Timer.GetTickCount", 0, |rt, _| {
            Ok((rt.timer.tick_count() as f64).into())
        }),
        // ImageList
        builtin("ImageList.LoadImage", 1, image_list_load_image),
        builtin("ImageList.GetWidthOfImage", 1, |rt, a| {
            Ok(rt.images.get_width_of_image(&text_arg(a, 0))?.into())
        }),
        builtin("ImageList.GetHeightOfImage", 1, |rt, a| {
            Ok(rt.images.get_height_of_image(&text_arg(a, 0))?.into())
        }),
        builtin("ImageList.RemoveImage", 1, |rt, a| {
            Ok(rt.images.remove_image(&text_arg(a, 0)).into())
        }),
        // GraphicsWindow
        builtin("GraphicsWindow.Show", 0, |rt, _| {
            rt.graphics_window.show()?;
            done()
        }),
        builtin("GraphicsWindow.Hide", 0, |rt, _| {
            rt.graphics_window.hide()?;
            done()
        }),
        builtin("GraphicsWindow.GetIsShown", 0, |rt, _| {
            Ok(rt.graphics_window.is_shown().into())
        }),
        builtin("GraphicsWindow.GetWidth", 0, |rt, _| Ok(rt.graphics_window.width().into())),
        builtin("GraphicsWindow.SetWidth", 1, |rt, a| {
            rt.graphics_window.set_width(ranged(a, 0)?)?;
            done()
        }),
        builtin("GraphicsWindow.GetHeight", 0, |rt, _| {
            Ok(rt.graphics_window.height().into())
        }),
        builtin("GraphicsWindow.SetHeight", 1, |rt, a| {
            rt.graphics_window.set_height(ranged(a, 0)?)?;
            done()
        }),
        builtin("GraphicsWindow.GetTitle", 0, |rt, _| Ok(rt.graphics_window.title().into())),
        builtin("GraphicsWindow.SetTitle", 1, |rt, a| {
            rt.graphics_window.set_title(&text_arg(a, 0))?;
            done()
        }),
        builtin("GraphicsWindow.GetCanResize", 0, |rt, _| {
            Ok(rt.graphics_window.can_resize().into())
        }),
        builtin("GraphicsWindow.SetCanResize", 1, |rt, a| {
            rt.graphics_window.set_can_resize(a[0].to_bool()?)?;
            done()
        }),
        builtin("GraphicsWindow.GetBackgroundColor", 0, |rt, _| {
            Ok(rt.graphics_window.background_color().into())
        }),
        builtin("GraphicsWindow.SetBackgroundColor", 1, |rt, a| {
            rt.graphics_window.set_background_color(&text_arg(a, 0))?;
            done()
        }),
        builtin("GraphicsWindow.GetPenColor", 0, |rt, _| {
            Ok(rt.graphics_window.pen_color().into())
        }),
        builtin("GraphicsWindow.SetPenColor", 1, |rt, a| {
            rt.graphics_window.set_pen_color(&text_arg(a, 0))?;
            done()
        }),
        builtin("GraphicsWindow.GetPenWidth", 0, |rt, _| {
            Ok(rt.graphics_window.pen_width().into())
        }),
        builtin("GraphicsWindow.SetPenWidth", 1, |rt, a| {
            rt.graphics_window.set_pen_width(number(a, 0)?)?;
            done()
        }),
        builtin("GraphicsWindow.GetBrushColor", 0, |rt, _| {
            Ok(rt.graphics_window.brush_color().into())
        }),
        builtin("GraphicsWindow.SetBrushColor", 1, |rt, a| {
            rt.graphics_window.set_brush_color(&text_arg(a, 0))?;
            done()
        }),
        builtin("GraphicsWindow.GetFontName", 0, |rt, _| {
            Ok(rt.graphics_window.font_name().into())
        }),
        builtin("GraphicsWindow.SetFontName", 1, |rt, a| {
            rt.graphics_window.set_font_name(&text_arg(a, 0))?;
            done()
        }),
        builtin("GraphicsWindow.GetFontSize", 0, |rt, _| {
            Ok(rt.graphics_window.font_size().into())
        }),
        builtin("GraphicsWindow.SetFontSize", 1, |rt, a| {
            rt.graphics_window.set_font_size(number(a, 0)?)?;
            done()
        }),
        builtin("GraphicsWindow.DrawRectangle", 4, |rt, a| {
            let (x, y) = point(a, 0)?;
            let (w, h) = point(a, 2)?;
            rt.graphics_window.draw_rectangle(x, y, w, h)?;
            done()
        }),
        builtin("GraphicsWindow.FillRectangle", 4, |rt, a| {
            let (x, y) = point(a, 0)?;
            let (w, h) = point(a, 2)?;
            rt.graphics_window.fill_rectangle(x, y, w, h)?;
            done()
        }),
        builtin("GraphicsWindow.DrawEllipse", 4, |rt, a| {
            let (x, y) = point(a, 0)?;
            let (w, h) = point(a, 2)?;
            rt.graphics_window.draw_ellipse(x, y, w, h)?;
            done()
        }),
        builtin("GraphicsWindow.FillEllipse", 4, |rt, a| {
            let (x, y) = point(a, 0)?;
            let (w, h) = point(a, 2)?;
            rt.graphics_window.fill_ellipse(x, y, w, h)?;
            done()
        }),
        builtin("GraphicsWindow.DrawTriangle", 6, |rt, a| {
            rt.graphics_window.draw_triangle(triangle(a)?)?;
            done()
        }),
        builtin("GraphicsWindow.FillTriangle", 6, |rt, a| {
            rt.graphics_window.fill_triangle(triangle(a)?)?;
            done()
        }),
        builtin("GraphicsWindow.DrawLine", 4, |rt, a| {
            rt.graphics_window.draw_line(point(a, 0)?, point(a, 2)?)?;
            done()
        }),
        builtin("GraphicsWindow.DrawText", 3, |rt, a| {
            let (x, y) = point(a, 0)?;
            rt.graphics_window.draw_text(x, y, &text_arg(a, 2))?;
            done()
        }),
        builtin("GraphicsWindow.DrawImage", 3, |rt, a| {
            let (x, y) = point(a, 1)?;
            rt.graphics_window.draw_image(&text_arg(a, 0), x, y)?;
            done()
        }),
        builtin("GraphicsWindow.SetPixel", 3, |rt, a| {
            let (x, y) = point(a, 0)?;
            rt.graphics_window.set_pixel(x, y, &text_arg(a, 2))?;
            done()
        }),
        builtin("GraphicsWindow.Clear", 0, |rt, _| {
            rt.graphics_window.clear()?;
            done()
        }),
        builtin("GraphicsWindow.GetColorFromRGB", 3, |_, a| {
            let color =
                GraphicsWindow::get_color_from_rgb(number(a, 0)?, number(a, 1)?, number(a, 2)?);
            Ok(color.into())
        }),
        builtin("GraphicsWindow.GetRandomColor", 0, |_, _| {
            Ok(GraphicsWindow::get_random_color().into())
        }),
        builtin("GraphicsWindow.GetLastKey", 0, |rt, _| {
            Ok(rt.graphics_window.last_key().into())
        }),
        builtin("GraphicsWindow.GetMouseX", 0, |rt, _| {
            Ok(rt.graphics_window.mouse_x().into())
        }),
        builtin("GraphicsWindow.GetMouseY", 0, |rt, _| {
            Ok(rt.graphics_window.mouse_y().into())
        }),
        // Shapes
        builtin("Shapes.AddRectangle", 2, |rt, a| {
            let (w, h) = point(a, 0)?;
            Ok(rt.shapes.add_rectangle(w, h)?.into_string().into())
        }),
        builtin("Shapes.AddEllipse", 2, |rt, a| {
            let (w, h) = point(a, 0)?;
            Ok(rt.shapes.add_ellipse(w, h)?.into_string().into())
        }),
        builtin("Shapes.AddTriangle", 6, |rt, a| {
            Ok(rt.shapes.add_triangle(triangle(a)?)?.into_string().into())
        }),
        builtin("Shapes.AddLine", 4, |rt, a| {
            let name = rt.shapes.add_line(point(a, 0)?, point(a, 2)?)?;
            Ok(name.into_string().into())
        }),
        builtin("Shapes.AddImage", 1, |rt, a| {
            Ok(rt.shapes.add_image(&text_arg(a, 0))?.into_string().into())
        }),
        builtin("Shapes.AddText", 1, |rt, a| {
            Ok(rt.shapes.add_text(&text_arg(a, 0))?.into_string().into())
        }),
        builtin("Shapes.SetText", 2, |rt, a| {
            rt.shapes.set_text(&text_arg(a, 0), &text_arg(a, 1))?;
            done()
        }),
        builtin("Shapes.Remove", 1, |rt, a| Ok(rt.shapes.remove(&text_arg(a, 0))?.into())),
        builtin("Shapes.Move", 3, |rt, a| {
            let (x, y) = point(a, 1)?;
            rt.shapes.move_to(&text_arg(a, 0), x, y)?;
            done()
        }),
        builtin("Shapes.GetLeft", 1, |rt, a| Ok(rt.shapes.get_left(&text_arg(a, 0))?.into())),
        builtin("Shapes.GetTop", 1, |rt, a| Ok(rt.shapes.get_top(&text_arg(a, 0))?.into())),
        builtin("Shapes.Rotate", 2, |rt, a| {
            rt.shapes.rotate(&text_arg(a, 0), number(a, 1)?)?;
            done()
        }),
        builtin("Shapes.GetAngle", 1, |rt, a| {
            Ok(rt.shapes.get_angle(&text_arg(a, 0))?.into())
        }),
        builtin("Shapes.Zoom", 3, |rt, a| {
            let (sx, sy) = point(a, 1)?;
            rt.shapes.zoom(&text_arg(a, 0), sx, sy)?;
            done()
        }),
        builtin("Shapes.SetOpacity", 2, |rt, a| {
            rt.shapes.set_opacity(&text_arg(a, 0), number(a, 1)?)?;
            done()
        }),
        builtin("Shapes.GetOpacity", 1, |rt, a| {
            Ok(rt.shapes.get_opacity(&text_arg(a, 0))?.into())
        }),
        builtin("Shapes.HideShape", 1, |rt, a| {
            rt.shapes.hide_shape(&text_arg(a, 0))?;
            done()
        }),
        builtin("Shapes.ShowShape", 1, |rt, a| {
            rt.shapes.show_shape(&text_arg(a, 0))?;
            done()
        }),
        builtin("Shapes.Animate", 4, shapes_animate),
        // Controls
        builtin("Controls.AddButton", 3, |rt, a| {
            let (x, y) = point(a, 1)?;
            Ok(rt.controls.add_button(&text_arg(a, 0), x, y)?.into_string().into())
        }),
        builtin("Controls.AddTextBox", 2, |rt, a| {
            let (x, y) = point(a, 0)?;
            Ok(rt.controls.add_text_box(x, y)?.into_string().into())
        }),
        builtin("Controls.AddMultiLineTextBox", 2, |rt, a| {
            let (x, y) = point(a, 0)?;
            Ok(rt.controls.add_multi_line_text_box(x, y)?.into_string().into())
        }),
        builtin("Controls.AddMultiLineTextBoxWithSize", 4, |rt, a| {
            let (x, y) = point(a, 0)?;
            let (w, h) = point(a, 2)?;
            let name = rt.controls.add_multi_line_text_box_with_size(x, y, w, h)?;
            Ok(name.into_string().into())
        }),
        builtin("Controls.GetTextBoxText", 1, |rt, a| {
            Ok(rt.controls.get_text_box_text(&text_arg(a, 0))?.into())
        }),
        builtin("Controls.SetTextBoxText", 2, |rt, a| {
            rt.controls.set_text_box_text(&text_arg(a, 0), &text_arg(a, 1))?;
            done()
        }),
        builtin("Controls.GetButtonCaption", 1, |rt, a| {
            Ok(rt.controls.get_button_caption(&text_arg(a, 0))?.into())
        }),
        builtin("Controls.SetButtonCaption", 2, |rt, a| {
            rt.controls.set_button_caption(&text_arg(a, 0), &text_arg(a, 1))?;
            done()
        }),
        builtin("Controls.Move", 3, |rt, a| {
            let (x, y) = point(a, 1)?;
            rt.controls.move_control(&text_arg(a, 0), x, y)?;
            done()
        }),
        builtin("Controls.SetSize", 3, |rt, a| {
            let (w, h) = point(a, 1)?;
            rt.controls.set_size(&text_arg(a, 0), w, h)?;
            done()
        }),
        builtin("Controls.Remove", 1, |rt, a| {
            Ok(rt.controls.remove_control(&text_arg(a, 0))?.into())
        }),
        builtin("Controls.GetLastClickedButton", 0, |rt, _| {
            Ok(rt.controls.last_clicked_button().into())
        }),
        builtin("Controls.GetLastTypedTextBox", 0, |rt, _| {
            Ok(rt.controls.last_typed_text_box().into())
        }),
        // TextWindow
        builtin("TextWindow.GetForegroundColor", 0, |rt, _| {
            Ok(rt.text_window.foreground_color().name().into())
        }),
        builtin("TextWindow.SetForegroundColor", 1, |rt, a| {
            rt.text_window.set_foreground_color(console_color(a, 0)?)?;
            done()
        }),
        builtin("TextWindow.GetBackgroundColor", 0, |rt, _| {
            Ok(rt.text_window.background_color().name().into())
        }),
        builtin("TextWindow.SetBackgroundColor", 1, |rt, a| {
            rt.text_window.set_background_color(console_color(a, 0)?)?;
            done()
        }),
        builtin("TextWindow.GetCursorLeft", 0, |rt, _| {
            Ok(i64::from(rt.text_window.cursor_left()?).into())
        }),
        builtin("TextWindow.SetCursorLeft", 1, |rt, a| {
            rt.text_window.set_cursor_left(ranged(a, 0)?)?;
            done()
        }),
        builtin("TextWindow.GetCursorTop", 0, |rt, _| {
            Ok(i64::from(rt.text_window.cursor_top()?).into())
        }),
        builtin("TextWindow.SetCursorTop", 1, |rt, a| {
            rt.text_window.set_cursor_top(ranged(a, 0)?)?;
            done()
        }),
        builtin("TextWindow.GetTitle", 0, |rt, _| Ok(rt.text_window.title().into())),
        builtin("TextWindow.SetTitle", 1, |rt, a| {
            rt.text_window.set_title(&text_arg(a, 0))?;
            done()
        }),
        builtin("TextWindow.Show", 0, |rt, _| {
            rt.text_window.show()?;
            done()
        }),
        builtin("TextWindow.Hide", 0, |rt, _| {
            rt.text_window.hide()?;
            done()
        }),
        builtin("TextWindow.GetIsVisible", 0, |rt, _| {
            Ok(rt.text_window.is_visible().into())
        }),
        builtin("TextWindow.Clear", 0, |rt, _| {
            rt.text_window.clear()?;
            done()
        }),
        builtin("TextWindow.Write", 1, |rt, a| {
            rt.text_window.write(&text_arg(a, 0))?;
            done()
        }),
        builtin("TextWindow.WriteLine", 1, |rt, a| {
            rt.text_window.write_line(&text_arg(a, 0))?;
            done()
        }),
        builtin("TextWindow.Pause", 0, |rt, _| {
            rt.text_window.pause()?;
            done()
        }),
        builtin("TextWindow.PauseIfVisible", 0, |rt, _| {
            Ok(rt.text_window.pause_if_visible()?.into())
        }),
        builtin("TextWindow.PauseWithoutMessage", 0, |rt, _| {
            rt.text_window.pause_without_message()?;
            done()
        }),
        builtin("TextWindow.Read", 0, |rt, _| Ok(rt.text_window.read()?.into())),
        builtin("TextWindow.ReadKey", 0, |rt, _| Ok(rt.text_window.read_key()?.into())),
        builtin("TextWindow.ReadNumber", 0, text_window_read_number),
        builtin("TextWindow.VerifyAccess", 0, |rt, _| {
            Ok(rt.text_window.verify_access().into())
        }),
    ];
    temp.into_iter().map(|b| (b.name, b)).collect()
});

/// Finds a builtin by its exact `Class.Operation` name
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name)
}

/// Every builtin name in alphabetical order
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = BUILTINS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Calls a builtin by name.
///
/// # Errors
/// * `NotFound` if no operation has that name.
/// * `InvalidArgument` if the number of arguments is wrong.
/// * Whatever the operation itself reports, logged at `warn` level.
pub fn call(rt: &Runtime, name: &str, args: &[Value]) -> RuntimeResult<Value> {
    let builtin = lookup(name).ok_or_else(|| RuntimeError::not_found("operation", name))?;
    if args.len() != builtin.arity {
        return Err(RuntimeError::invalid_argument(format!(
            "{name} expects {} arguments, got {}",
            builtin.arity,
            args.len()
        )));
    }
    tracing::trace!(name, ?args, "Calling builtin");
    (builtin.func)(rt, args).inspect_err(|e| tracing::warn!(name, error = %e, "Builtin failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallbasic_runtime::RuntimeConfig;

    fn runtime() -> Runtime {
        Runtime::headless(RuntimeConfig::default()).unwrap().0
    }

    #[test]
    fn test_unknown_operation() {
        let rt = runtime();
        let err = call(&rt, "Math.Frobnicate", &[]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "operation with name Math.Frobnicate not found");
    }

    #[test]
    fn test_wrong_arity() {
        let rt = runtime();
        let err = call(&rt, "Math.Abs", &[]).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("Math.Abs expects 1 arguments, got 0"));
    }

    #[test]
    fn test_text_and_math() {
        let rt = runtime();
        let index = call(&rt, "Text.GetIndexOf", &["abcabc".into(), "bc".into()]).unwrap();
        assert_eq!(index.to_text(), "2");
        let missing = call(&rt, "Text.GetIndexOf", &["abc".into(), "z".into()]).unwrap();
        assert_eq!(missing.to_text(), "0");
        let root = call(&rt, "Math.SquareRoot", &[Value::parse_literal("16")]).unwrap();
        assert_eq!(root.to_text(), "4");
    }

    #[test]
    fn test_stack_and_queue() {
        let rt = runtime();
        assert_eq!(
            call(&rt, "Stack.PushValue", &["s".into(), 1.into()]).unwrap(),
            Value::Bool(true)
        );
        call(&rt, "Stack.PushValue", &["s".into(), "x".into()]).unwrap();
        assert_eq!(call(&rt, "Stack.PopValue", &["s".into()]).unwrap().to_text(), "x");
        assert_eq!(call(&rt, "Stack.GetCount", &["s".into()]).unwrap().to_text(), "1");

        call(&rt, "Queue.EnqueueValue", &["q".into(), 1.into()]).unwrap();
        call(&rt, "Queue.EnqueueValue", &["q".into(), 2.into()]).unwrap();
        assert_eq!(call(&rt, "Queue.DequeueValue", &["q".into()]).unwrap().to_text(), "1");
        assert!(call(&rt, "Queue.GetCount", &["nope".into()]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_draw_before_show() {
        let rt = runtime();
        let args: Vec<Value> = [0, 0, 10, 10].into_iter().map(Value::from).collect();
        let err = call(&rt, "GraphicsWindow.DrawRectangle", &args).unwrap_err();
        assert!(err.is_not_initialized());
        call(&rt, "GraphicsWindow.Show", &[]).unwrap();
        call(&rt, "GraphicsWindow.DrawRectangle", &args).unwrap();
    }

    #[test]
    fn test_every_class_is_registered() {
        let classes: std::collections::BTreeSet<_> = names()
            .into_iter()
            .filter_map(|name| name.split_once('.').map(|(class, _)| class))
            .collect();
        insta::assert_debug_snapshot!(classes, @r#"
        {
            "Clock",
            "Controls",
            "Desktop",
            "File",
            "GraphicsWindow",
            "ImageList",
            "Math",
            "Mouse",
            "Network",
            "Program",
            "Queue",
            "Shapes",
            "Sound",
            "Stack",
            "Text",
            "TextWindow",
            "Timer",
        }
        "#);
    }
}
