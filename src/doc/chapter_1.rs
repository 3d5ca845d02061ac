/*!
# What the Scanner Understands

U8g2 Preview does not compile C++. It reads the sketch one line at a time,
the way you might skim it, and picks out three things.

## Macros and constants

Object-like macros with an arithmetic body become numbers.

```text
#define MARGIN 2
#define BAR_W (WIDTH - 2 * MARGIN)
```

Then assignments ending in a semicolon, with or without `const`,
`constexpr` and a type:

```text
const int BAR_H = 6;
int top = BAR_H + MARGIN;
```

All macros are read before any constant, so a constant may use a macro
defined further down. A constant that uses another constant declared below
it does not see its value. The result is not a number, which is reported as
a warning on that line, and any call using it is skipped with a warning of
its own.

`WIDTH` and `HEIGHT` always hold the display size, as do
`display.width()` and `display.height()`.

Expressions support `+ - * /` and parentheses. There is no unary minus,
no `%` and no function calls. Division by zero is not a number.

## Drawing calls

These calls are recognized with any prefix, so `u8g2.`, `display->` and
`ns::` all work:

| Call | Draws |
|------|-------|
| `setDrawColor(c)` | subsequent shapes and text in the foreground when `c` is not 0 |
| `drawPixel(x, y)` | one pixel |
| `drawLine(x0, y0, x1, y1)` | a line |
| `drawBox(x, y, w, h)`, `fillRect(x, y, w, h)` | a filled rectangle |
| `drawFrame(x, y, w, h)`, `drawRect(x, y, w, h)` | a rectangle outline |
| `drawFastVLine(x, y, h)`, `drawFastHLine(x, y, w)` | a one pixel wide bar |
| `drawCircle(x, y, r)`, `drawDisc(x, y, r)` | a circle or a filled disc |
| `drawStr(x, y, text)` | text with its baseline at `y` |
| `setCursor(x, y)`, `print(text)`, `println(text)` | text at the cursor |
| `setFont(name)` | switches font |

A call must open and close on the same line. Numbers are truncated to
integers. Text arguments may be string literals, numeric expressions or
the tokens `PvTime` and `PvDate`, which print the current time and date.

## Fonts

For each `setFont(u8g2_font_...)` a matching BDF file is looked for in the
font directory, and downloaded from `--fetch-url` when it is missing. With
`--bdf FILE` one font is used for every `setFont`. A font that cannot be
found is drawn with a built-in 5x7 font sized from the digits in its name,
so `u8g2_font_10x20_tf` draws large and `u8g2_font_5x7_tr` small.
*/
